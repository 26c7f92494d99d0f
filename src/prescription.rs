use crate::drugs::{Drug, DrugCatalog};
use crate::virus::DiseaseKind;

/// Selects the two drugs for a patient: one for symptom relief, dosed with `dose1`, and one
/// against the disease itself, dosed with `dose2`.
pub fn prescribe(kind: DiseaseKind, catalog: &dyn DrugCatalog, dose1: f64, dose2: f64) -> [Drug; 2] {
    match kind {
        DiseaseKind::SeasonalFlu => [
            catalog.get_antifever(dose1),
            catalog.get_seasonal_antivirus(dose2),
        ],
        DiseaseKind::SarsCov2 => [
            catalog.get_antifever(dose1),
            catalog.get_sars_antivirus(dose2),
        ],
        DiseaseKind::Cholera => [
            catalog.get_rehydration(dose1),
            catalog.get_cholera_antivirus(dose2),
        ],
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::drugs::{CheapDrugCatalog, ExpensiveDrugCatalog};

    #[test]
    fn cholera_gets_rehydration() {
        let drugs = prescribe(DiseaseKind::Cholera, &ExpensiveDrugCatalog, 0.2, 0.7);
        assert_eq!(
            drugs,
            [
                Drug::Rehydron { dose: 0.2 },
                Drug::CholeraAntivirus { dose: 0.7 }
            ]
        );
    }

    #[test]
    fn respiratory_diseases_get_antifever() {
        let flu = prescribe(DiseaseKind::SeasonalFlu, &ExpensiveDrugCatalog, 0.1, 0.4);
        assert_eq!(flu[0], Drug::Ibuprofen { dose: 0.1 });
        assert_eq!(flu[1], Drug::SeasonalFluAntivirus { dose: 0.4 });

        let sars = prescribe(DiseaseKind::SarsCov2, &CheapDrugCatalog, 0.1, 0.4);
        assert_eq!(
            sars,
            [Drug::Aspirin { dose: 0.1 }, Drug::Placebo { dose: 0.4 }]
        );
    }
}
