//! Demo data for `/api/dev/seed`
//!
//! A small coffee shop: raw materials, products whose recipes reference the
//! materials by index, and a few customers.
//!
//! Raw materials (index):
//!   0: Biji Kopi Arabika (kg)
//!   1: Susu Segar (liter)
//!   2: Gula Aren (kg)
//!   3: Teh Melati (kg)
//!   4: Tepung Terigu (kg)
//!   5: Telur (butir)
//!   6: Cup Plastik (pcs)

use shared::models::{
    CustomerCreate, CustomerSegment, ProductCreate, RawMaterialCreate, RecipeInput,
};

pub const DEMO_STORE_NAME: &str = "Kopi Nusantara (Demo)";
pub const DEMO_OWNER_NAME: &str = "Pemilik Demo";
pub const DEMO_OWNER_EMAIL: &str = "demo@qios.id";
pub const DEMO_OWNER_PASSWORD: &str = "qios-demo-123";

/// Product template with recipe lines pointing into [`raw_materials`]
pub struct DemoProduct {
    pub data: ProductCreate,
    /// `(material index, quantity per unit)`
    pub recipe: Vec<(usize, f64)>,
}

impl DemoProduct {
    /// Recipe inputs once the materials have ids
    pub fn recipe_inputs(&self, material_ids: &[i64]) -> Vec<RecipeInput> {
        self.recipe
            .iter()
            .filter_map(|(index, quantity)| {
                material_ids.get(*index).map(|id| RecipeInput {
                    raw_material_id: *id,
                    quantity: *quantity,
                })
            })
            .collect()
    }
}

fn material(
    store_id: i64,
    name: &str,
    unit: &str,
    stock: f64,
    min: f64,
    cost: f64,
    supplier: &str,
) -> RawMaterialCreate {
    RawMaterialCreate {
        store_id,
        name: name.into(),
        unit: unit.into(),
        stock: Some(stock),
        min_stock_level: Some(min),
        cost_per_unit: Some(cost),
        supplier: Some(supplier.into()),
    }
}

pub fn raw_materials(store_id: i64) -> Vec<RawMaterialCreate> {
    vec![
        material(store_id, "Biji Kopi Arabika", "kg", 5.0, 1.0, 180_000.0, "CV Kopi Gayo"),
        material(store_id, "Susu Segar", "liter", 20.0, 5.0, 18_000.0, "Koperasi Susu Lembang"),
        material(store_id, "Gula Aren", "kg", 8.0, 2.0, 35_000.0, "UD Gula Jawa"),
        material(store_id, "Teh Melati", "kg", 2.0, 0.5, 90_000.0, "PT Teh Slawi"),
        material(store_id, "Tepung Terigu", "kg", 10.0, 3.0, 14_000.0, "Toko Bahan Kue Sinar"),
        material(store_id, "Telur", "butir", 60.0, 15.0, 2_200.0, "Peternakan Makmur"),
        material(store_id, "Cup Plastik", "pcs", 300.0, 50.0, 800.0, "Toko Kemasan Jaya"),
    ]
}

#[allow(clippy::too_many_arguments)]
fn product(
    store_id: i64,
    name: &str,
    sku: &str,
    category: &str,
    price: f64,
    cost: f64,
    stock: i32,
    recipe: Vec<(usize, f64)>,
) -> DemoProduct {
    DemoProduct {
        data: ProductCreate {
            store_id,
            name: name.into(),
            sku: Some(sku.into()),
            category: Some(category.into()),
            description: None,
            price,
            cost: Some(cost),
            stock_quantity: Some(stock),
            min_stock_level: Some(10),
            unit: Some("pcs".into()),
            image_url: None,
            recipe: vec![],
        },
        recipe,
    }
}

pub fn products(store_id: i64) -> Vec<DemoProduct> {
    vec![
        product(store_id, "Kopi Susu Gula Aren", "KOPI-001", "Kopi", 18_000.0, 7_500.0, 100,
            vec![(0, 0.018), (1, 0.15), (2, 0.02), (6, 1.0)]),
        product(store_id, "Americano", "KOPI-002", "Kopi", 15_000.0, 4_500.0, 100,
            vec![(0, 0.018), (6, 1.0)]),
        product(store_id, "Cafe Latte", "KOPI-003", "Kopi", 22_000.0, 8_000.0, 80,
            vec![(0, 0.018), (1, 0.2), (6, 1.0)]),
        product(store_id, "Es Teh Melati", "TEH-001", "Teh", 8_000.0, 2_000.0, 150,
            vec![(3, 0.005), (2, 0.015), (6, 1.0)]),
        product(store_id, "Pisang Goreng", "SNK-001", "Camilan", 12_000.0, 4_000.0, 40,
            vec![(4, 0.05), (5, 1.0)]),
        product(store_id, "Roti Bakar Cokelat", "SNK-002", "Camilan", 15_000.0, 5_500.0, 40,
            vec![(4, 0.08), (5, 1.0), (1, 0.05)]),
    ]
}

fn customer(
    store_id: i64,
    name: &str,
    phone: &str,
    email: Option<&str>,
    segment: CustomerSegment,
) -> CustomerCreate {
    CustomerCreate {
        store_id,
        name: name.into(),
        phone: Some(phone.into()),
        email: email.map(String::from),
        address: None,
        segment: Some(segment),
        notes: None,
    }
}

pub fn customers(store_id: i64) -> Vec<CustomerCreate> {
    vec![
        customer(store_id, "Budi Santoso", "081234567890", Some("budi@example.com"), CustomerSegment::Vip),
        customer(store_id, "Siti Rahayu", "081298765432", Some("siti@example.com"), CustomerSegment::Regular),
        customer(store_id, "Agus Wijaya", "085711223344", None, CustomerSegment::Regular),
        customer(store_id, "Dewi Lestari", "087855667788", None, CustomerSegment::New),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::products::validate_recipe;

    #[test]
    fn recipes_reference_existing_materials() {
        let materials = raw_materials(1);
        let ids: Vec<i64> = (100..100 + materials.len() as i64).collect();
        for p in products(1) {
            let inputs = p.recipe_inputs(&ids);
            assert_eq!(inputs.len(), p.recipe.len(), "{}", p.data.name);
            validate_recipe(&inputs).unwrap();
        }
    }

    #[test]
    fn skus_are_unique() {
        let mut skus: Vec<String> = products(1).into_iter().filter_map(|p| p.data.sku).collect();
        let count = skus.len();
        skus.sort();
        skus.dedup();
        assert_eq!(skus.len(), count);
    }
}
