//! Deterministic synthetic data for tests and demos.
//!
//! The generated rows follow the house dataset schema, with prices driven by
//! area, rooms, age, location and condition plus uniform noise.

use rand::prelude::*;

use crate::data::{FeatureColumn, HouseFeatures, TrainingTable, ID_COLUMN, TARGET_COLUMN};

pub const LOCATIONS: [&str; 4] = ["Downtown", "Rural", "Suburban", "Urban"];
pub const CONDITIONS: [&str; 4] = ["Excellent", "Fair", "Good", "Poor"];
pub const GARAGES: [&str; 2] = ["No", "Yes"];

/// The house used by the form defaults: 2000 sq ft, 3 bed, 2 bath, 1 floor,
/// built in 2000, Urban, Good, with garage.
pub fn reference_house() -> HouseFeatures {
    HouseFeatures {
        area: 2000.0,
        bedrooms: 3.0,
        bathrooms: 2.0,
        floors: 1.0,
        year_built: 2000.0,
        location: "Urban".into(),
        condition: "Good".into(),
        garage: "Yes".into(),
    }
}

/// Generate `n_rows` labeled houses.
///
/// The first rows cycle through every label, so any table with at least four
/// rows contains all locations and conditions.
pub fn synthetic_table(n_rows: usize, seed: u64) -> TrainingTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(n_rows);
    let mut prices = Vec::with_capacity(n_rows);

    for i in 0..n_rows {
        let pick = |labels: &[&'static str], rng: &mut StdRng| {
            if i < labels.len() {
                labels[i]
            } else {
                labels[rng.gen_range(0..labels.len())]
            }
        };
        let location = pick(&LOCATIONS, &mut rng);
        let condition = pick(&CONDITIONS, &mut rng);
        let garage = pick(&GARAGES, &mut rng);

        let house = HouseFeatures {
            area: f64::from(rng.gen_range(500u32..=5000)),
            bedrooms: f64::from(rng.gen_range(1u32..=5)),
            bathrooms: f64::from(rng.gen_range(1u32..=4)),
            floors: f64::from(rng.gen_range(1u32..=3)),
            year_built: f64::from(rng.gen_range(1900u32..=2023)),
            location: location.into(),
            condition: condition.into(),
            garage: garage.into(),
        };

        prices.push(synthetic_price(&house, &mut rng));
        rows.push(house);
    }

    TrainingTable::from_records(rows, prices)
}

fn synthetic_price(house: &HouseFeatures, rng: &mut StdRng) -> f64 {
    let location = match house.location.as_str() {
        "Downtown" => 120_000.0,
        "Urban" => 80_000.0,
        "Suburban" => 40_000.0,
        _ => 0.0,
    };
    let condition = match house.condition.as_str() {
        "Excellent" => 60_000.0,
        "Good" => 30_000.0,
        "Fair" => 10_000.0,
        _ => 0.0,
    };
    let garage = if house.garage == "Yes" { 15_000.0 } else { 0.0 };

    50_000.0
        + house.area * 120.0
        + house.bedrooms * 8_000.0
        + house.bathrooms * 6_000.0
        + house.floors * 4_000.0
        + (house.year_built - 1900.0) * 500.0
        + location
        + condition
        + garage
        + rng.gen_range(-10_000.0..10_000.0)
}

/// Render a table as CSV text in the dataset's column layout, `Id` first.
pub fn to_csv(table: &TrainingTable) -> String {
    let mut out = String::new();
    out.push_str(ID_COLUMN);
    for column in FeatureColumn::ALL {
        out.push(',');
        out.push_str(column.name());
    }
    out.push(',');
    out.push_str(TARGET_COLUMN);
    out.push('\n');

    for (i, (house, price)) in table.rows().iter().zip(table.prices()).enumerate() {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            i + 1,
            house.area,
            house.bedrooms,
            house.bathrooms,
            house.floors,
            house.year_built,
            house.location,
            house.condition,
            house.garage,
            price
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CategoricalColumn;

    #[test]
    fn synthetic_table_is_deterministic() {
        let a = synthetic_table(50, 7);
        let b = synthetic_table(50, 7);
        assert_eq!(a.rows(), b.rows());
        assert_eq!(a.prices(), b.prices());
        assert_ne!(synthetic_table(50, 8).prices(), a.prices());
    }

    #[test]
    fn synthetic_table_covers_labels() {
        let table = synthetic_table(10, 1);
        for label in LOCATIONS {
            assert!(table.rows().iter().any(|r| r.category(CategoricalColumn::Location) == label));
        }
        for label in CONDITIONS {
            assert!(table.rows().iter().any(|r| r.condition == label));
        }
        assert!(table.prices().iter().all(|&p| p > 0.0));
    }

    #[test]
    fn csv_text_loads_back() {
        let table = synthetic_table(12, 2);
        let text = to_csv(&table);
        let loaded = TrainingTable::from_csv_reader(text.as_bytes()).unwrap();
        assert_eq!(loaded.rows(), table.rows());
        assert_eq!(loaded.prices(), table.prices());
    }
}
