//! Closed-form evaluators for the recomputed reference values.
//!
//! All results are rounded to two decimals, the precision students are
//! asked to report.

/// Gas constant in MPa·L/(mol·K).
pub const GAS_CONSTANT: f64 = 0.008314;
/// Laboratory temperature in kelvin.
pub const TEMPERATURE_K: f64 = 295.0;
/// Initial coleoptile segment length in mm.
pub const COLEOPTILE_INITIAL_MM: f64 = 10.0;
/// Specific extinction coefficient of chlorophyll a at 665 nm.
pub const CHLOROPHYLL_EXTINCTION: f64 = 76.07;
/// Dilution of the spinach pigment extract.
pub const EXTRACT_DILUTION: f64 = 50.0;
/// Dilution of the thylakoid suspension.
pub const THYLAKOID_DILUTION: f64 = 100.0;
/// Extract volume (mL) per tissue mass (g).
pub const EXTRACT_ML: f64 = 8.0;
pub const TISSUE_G: f64 = 4.0;
/// Thylakoid suspension volume added to each Hill tube, in mL.
pub const HILL_SUSPENSION_ML: f64 = 0.5;
/// Reaction volume of a Hill tube, in mL.
pub const HILL_REACTION_ML: f64 = 3.5;
/// Ferricyanide standard-curve factor (ABS420 → mM).
pub const FERRICYANIDE_FACTOR: f64 = 4.0;
/// Electrons per O₂ released.
pub const ELECTRONS_PER_O2: f64 = 4.0;
/// Starch calibration slope of the iodine assay.
pub const STARCH_SLOPE: f64 = 11.4;
pub const AMYLASE_DILUTION: f64 = 7.0;
/// 10 minute assay scaled to one hour.
pub const AMYLASE_PER_HOUR: f64 = 6.0;
pub const AMYLASE_SEEDS_ML: f64 = 10.0;
pub const AMYLASE_SAMPLE_ML: f64 = 0.25;

/// Round to two decimals, halves away from zero.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// `Ψπ = −C·R·T` in MPa.
pub fn osmotic_potential(concentration: f64, gas_constant: f64, temperature_k: f64) -> f64 {
    round2(-concentration * gas_constant * temperature_k)
}

/// `(final − initial) / initial × 100`.
pub fn percent_change(initial: f64, final_value: f64) -> f64 {
    round2((final_value - initial) / initial * 100.0)
}

/// Chlorophyll a in mg/mL from absorbance at 665 nm.
pub fn chlorophyll_concentration(absorbance: f64, dilution: f64) -> f64 {
    round2(absorbance / CHLOROPHYLL_EXTINCTION * dilution)
}

/// Chlorophyll per gram of fresh tissue.
pub fn chlorophyll_per_gram(concentration: f64) -> f64 {
    round2(concentration * EXTRACT_ML / TISSUE_G)
}

/// Chlorophyll mass in one Hill tube.
pub fn chlorophyll_in_suspension(concentration: f64) -> f64 {
    round2(concentration * HILL_SUSPENSION_ML)
}

/// Ferricyanide concentration in mM from ABS420.
pub fn ferricyanide(absorbance: f64) -> f64 {
    round2(absorbance * FERRICYANIDE_FACTOR)
}

/// Ferricyanide normalised by chlorophyll (µmol/mg Chl).
pub fn hill_reduction(ferricyanide_mm: f64, chlorophyll_mg: f64) -> f64 {
    round2(ferricyanide_mm * HILL_REACTION_ML / chlorophyll_mg)
}

/// Reduction rates derived from the kinetics slope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HillRates {
    pub per_minute: f64,
    pub per_hour: f64,
    pub oxygen_per_hour: f64,
}

pub fn hill_rates(slope: f64) -> HillRates {
    let per_minute = round2(slope).abs();
    let per_hour = round2(per_minute * 60.0);
    HillRates {
        per_minute,
        per_hour,
        oxygen_per_hour: round2(per_hour / ELECTRONS_PER_O2),
    }
}

/// Activity lost under DCMU, from the light control and the inhibited tube.
pub fn dcmu_activity(control_mm: f64, inhibited_mm: f64, chlorophyll_mg: f64) -> f64 {
    round2((control_mm - inhibited_mm) * HILL_REACTION_ML * ELECTRONS_PER_O2 / chlorophyll_mg)
}

/// Starch degraded per hour (mg) from the iodine absorbances.
pub fn starch_degraded(abs_initial: f64, abs_final: f64) -> f64 {
    round2((abs_initial - abs_final) / STARCH_SLOPE * AMYLASE_DILUTION * AMYLASE_PER_HOUR)
}

/// Seed dry mass present in the reaction (mg).
pub fn seed_mass_in_reaction(dry_mg: f64) -> f64 {
    dry_mg / AMYLASE_SEEDS_ML * AMYLASE_SAMPLE_ML
}

/// α-amylase activity per mg of seed.
pub fn amylase_activity(starch_mg: f64, dry_mg: f64) -> f64 {
    round2(starch_mg / seed_mass_in_reaction(dry_mg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(1.0), 1.0);
    }

    #[test]
    fn osmotic_potential_of_sucrose() {
        assert_eq!(osmotic_potential(0.1, GAS_CONSTANT, TEMPERATURE_K), -0.25);
        assert_eq!(osmotic_potential(0.5, GAS_CONSTANT, TEMPERATURE_K), -1.23);
        assert_eq!(osmotic_potential(0.0, GAS_CONSTANT, TEMPERATURE_K), 0.0);
    }

    #[test]
    fn percent_change_of_weights() {
        assert_eq!(percent_change(2.0, 1.7), -15.0);
        assert_eq!(percent_change(10.0, 14.5), 45.0);
    }

    #[test]
    fn chlorophyll_chain() {
        let conc = chlorophyll_concentration(0.532, EXTRACT_DILUTION);
        assert_eq!(conc, 0.35);
        assert_eq!(chlorophyll_per_gram(conc), 0.7);
        let ml = chlorophyll_concentration(0.38, THYLAKOID_DILUTION);
        assert_eq!(ml, 0.5);
        assert_eq!(chlorophyll_in_suspension(ml), 0.25);
    }

    #[test]
    fn hill_chain() {
        assert_eq!(ferricyanide(0.24), 0.96);
        assert_eq!(hill_reduction(0.96, 0.25), 13.44);
        let rates = hill_rates(-0.392);
        assert_eq!(rates.per_minute, 0.39);
        assert_eq!(rates.per_hour, 23.4);
        assert_eq!(rates.oxygen_per_hour, 5.85);
        assert_eq!(dcmu_activity(0.96, 0.9, 0.25), 3.36);
    }

    #[test]
    fn amylase_chain() {
        let starch = starch_degraded(1.2, 0.7);
        assert_eq!(starch, 1.84);
        assert_eq!(seed_mass_in_reaction(250.0), 6.25);
        assert_eq!(amylase_activity(starch, 250.0), 0.29);
    }
}
