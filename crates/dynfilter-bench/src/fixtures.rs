//! Test data generation for benchmarks.
//!
//! All generators are seeded so runs are reproducible.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use dynfilter_core::{Entity, EntityDef};
use dynfilter_proto::{QueryCondition, QueryOperator};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Scale factor for benchmark data generation.
#[derive(Clone, Copy, Debug, Default)]
pub enum Scale {
    /// 10 entities, for quick iteration.
    Tiny,
    /// 100 entities.
    Small,
    /// 2,000 entities.
    #[default]
    Medium,
    /// 100,000 entities.
    Large,
}

impl Scale {
    /// Get the entity count for this scale.
    pub fn count(&self) -> usize {
        match self {
            Scale::Tiny => 10,
            Scale::Small => 100,
            Scale::Medium => 2_000,
            Scale::Large => 100_000,
        }
    }
}

/// Postal address embedded in a customer.
pub struct Address {
    pub city: String,
    pub country: String,
    pub zip: Option<String>,
}

/// Audit fields shared by stored records.
pub struct Record {
    pub id: Uuid,
    pub created_at: NaiveDateTime,
}

/// Customer entity used by the benchmarks.
pub struct Customer {
    pub record: Record,
    pub name: Option<String>,
    pub email: String,
    pub age: i32,
    pub status: String,
    pub balance: Decimal,
    pub verified: bool,
    pub address: Option<Address>,
}

impl Entity for Address {
    fn describe() -> EntityDef {
        EntityDef::builder::<Address>("Address")
            .field("City", |a| &a.city)
            .field("Country", |a| &a.country)
            .field("Zip", |a| &a.zip)
            .build()
    }
}

impl Entity for Record {
    fn describe() -> EntityDef {
        EntityDef::builder::<Record>("Record")
            .field("Id", |r| &r.id)
            .field("CreatedAt", |r| &r.created_at)
            .build()
    }
}

impl Entity for Customer {
    fn describe() -> EntityDef {
        EntityDef::builder::<Customer>("Customer")
            .extends(|c| &c.record)
            .field("Name", |c| &c.name)
            .field("Email", |c| &c.email)
            .field("Age", |c| &c.age)
            .field("Status", |c| &c.status)
            .field("Balance", |c| &c.balance)
            .field("Verified", |c| &c.verified)
            .optional_embedded("Address", |c| c.address.as_ref())
            .build()
    }
}

const STATUSES: [&str; 4] = ["active", "inactive", "pending", "admin"];
const NAME_PREFIXES: [&str; 10] = [
    "Alice", "Bob", "Charlie", "David", "Eve", "Frank", "Grace", "Henry", "Ivy", "Jack",
];
const CITIES: [&str; 5] = ["NYC", "London", "Paris", "Berlin", "Tokyo"];
const COUNTRIES: [&str; 5] = ["US", "UK", "FR", "DE", "JP"];

/// Generate a random string of specified length.
fn random_string(rng: &mut StdRng, len: usize) -> String {
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

/// Generate customers with a realistic field distribution.
///
/// About one in ten customers has no name and one in eight has no address.
pub fn generate_customers(count: usize) -> Vec<Customer> {
    const SEED: u64 = 12345;
    let mut rng = StdRng::seed_from_u64(SEED);
    let epoch = NaiveDate::from_ymd_opt(2020, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN);

    (0..count)
        .map(|i| {
            let name = if rng.gen_bool(0.9) {
                Some(format!("{}_{}", NAME_PREFIXES[i % NAME_PREFIXES.len()], i))
            } else {
                None
            };
            let address = if rng.gen_bool(0.875) {
                let city = i % CITIES.len();
                Some(Address {
                    city: CITIES[city].to_string(),
                    country: COUNTRIES[city].to_string(),
                    zip: rng.gen_bool(0.5).then(|| format!("{:05}", rng.gen_range(0..100_000))),
                })
            } else {
                None
            };

            Customer {
                record: Record {
                    id: Uuid::from_u128(rng.gen()),
                    created_at: epoch + Duration::minutes(rng.gen_range(0..3 * 365 * 24 * 60)),
                },
                name,
                email: format!("{}@example{}.com", random_string(&mut rng, 8), i % 10),
                age: 18 + (rng.gen::<u32>() % 60) as i32,
                status: STATUSES[i % STATUSES.len()].to_string(),
                balance: Decimal::new(rng.gen_range(0..10_000_000), 2),
                verified: rng.gen_bool(0.6),
                address,
            }
        })
        .collect()
}

/// A single equality condition.
pub fn simple_conditions() -> Vec<QueryCondition> {
    vec![QueryCondition::equal("Status", "active")]
}

/// A mix of text, range and nested conditions.
pub fn mixed_conditions() -> Vec<QueryCondition> {
    vec![
        QueryCondition::contains("Name", "a"),
        QueryCondition::between("Age", "25", "55").not_null(),
        QueryCondition::equal("Address.City", "NYC"),
        QueryCondition::new("Balance", QueryOperator::GreaterEqual, "1000.50"),
        QueryCondition::equal("Verified", "1"),
    ]
}

/// Conditions reaching through the base type and embedded entities.
pub fn nested_conditions() -> Vec<QueryCondition> {
    vec![
        QueryCondition::new(
            "CreatedAt",
            QueryOperator::Between,
            "2021-01-01T00:00:00|2022-06-30 23:59:59",
        ),
        QueryCondition::starts_with("Address.Zip", "1"),
        QueryCondition::not_equal("Address.Country", "JP").not_null(),
    ]
}

/// `count` condition lists that differ only in their values.
pub fn distinct_condition_lists(count: usize) -> Vec<Vec<QueryCondition>> {
    (0..count)
        .map(|i| {
            vec![
                QueryCondition::greater("Age", (18 + i % 60).to_string()),
                QueryCondition::equal("Status", STATUSES[i % STATUSES.len()]),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate_customers(50);
        let b = generate_customers(50);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.record.id, y.record.id);
            assert_eq!(x.name, y.name);
            assert_eq!(x.balance, y.balance);
        }
    }

    #[test]
    fn test_condition_sets_compile() {
        let compiler = dynfilter_core::QueryCompiler::default();
        for conditions in [simple_conditions(), mixed_conditions(), nested_conditions()] {
            assert!(compiler.compile::<Customer>(&conditions).is_ok());
        }
    }
}
