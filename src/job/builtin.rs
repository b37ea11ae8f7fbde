//! Jobs shipped with the server
//!
//! Both operate on transaction records of the shape
//! `{"id", "merchant", "amount", "date", "reflected", "user_id"}`; the
//! happiness job additionally accepts user records `{"id", "name"}`.

use serde_json::{json, Value};

use super::{Group, Job, JobError, JobId, JobResult, Pair};

pub const TRANSACTION_COUNT: JobId = JobId(1);
pub const HAPPINESS_PERCENTAGE: JobId = JobId(2);

/// Every built-in job
pub fn all() -> Vec<Job> {
    vec![transaction_count(), happiness_percentage_per_user()]
}

/// Number of transactions per merchant
pub fn transaction_count() -> Job {
    Job::new(
        TRANSACTION_COUNT,
        "transactionCount",
        "/count-merchant-transactions",
        |transaction| {
            let merchant = transaction
                .get("merchant")
                .ok_or(JobError::MissingField { field: "merchant" })?;
            Ok(Pair::new(merchant.clone(), 1))
        },
        |by_merchant| Ok(Pair::new(by_merchant.key().clone(), sum(by_merchant)?)),
        |results| json!({ "merchant_transaction_count": as_array(results) }),
    )
}

/// Share of `GOOD` reflections per user, reported under the user's name
pub fn happiness_percentage_per_user() -> Job {
    Job::new(
        HAPPINESS_PERCENTAGE,
        "happinessPercentagePerUser",
        "/calculate-user-happiness",
        |record| match record.get("user_id").filter(|v| is_truthy(v)) {
            Some(user_id) => Ok(Pair::new(
                user_id.clone(),
                json!({ "reflected": record.get("reflected").cloned().unwrap_or(Value::Null) }),
            )),
            None => {
                let id = record
                    .get("id")
                    .ok_or(JobError::MissingField { field: "id" })?;
                Ok(Pair::new(
                    id.clone(),
                    json!({ "name": record.get("name").cloned().unwrap_or(Value::Null) }),
                ))
            }
        },
        happiness_reducer,
        |results| json!({ "user_happiness": as_array(results) }),
    )
}

fn happiness_reducer(by_user: &Group) -> JobResult<Pair> {
    let name = by_user
        .values()
        .iter()
        .filter_map(|datum| datum.get("name"))
        .find(|name| is_truthy(name))
        .ok_or_else(|| JobError::EmptyGroup {
            key: by_user.key().to_string(),
            what: "name record",
        })?;

    let reflections: Vec<&Value> = by_user
        .values()
        .iter()
        .filter_map(|datum| datum.get("reflected"))
        .filter(|reflected| is_truthy(reflected))
        .collect();
    let good = reflections
        .iter()
        .filter(|reflected| reflected.as_str() == Some("GOOD"))
        .count();

    Ok(Pair::new(
        name.clone(),
        format!("{}%", percentage(good, reflections.len())),
    ))
}

/// Rounded percentage, half rounding up; a user without reflections is 0%
fn percentage(part: usize, total: usize) -> u64 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u64
}

/// Sum of a group's numeric values, integral when every value is an integer
fn sum(group: &Group) -> JobResult<Value> {
    let mut integral: Option<i64> = Some(0);
    let mut total = 0.0;

    for value in group.values() {
        let number = value.as_f64().ok_or_else(|| {
            JobError::InvalidRecord(format!(
                "cannot sum non-numeric value {} for {}",
                value,
                group.key()
            ))
        })?;
        total += number;
        integral = match (integral, value.as_i64()) {
            (Some(acc), Some(n)) => acc.checked_add(n),
            _ => None,
        };
    }

    Ok(match integral {
        Some(n) => Value::from(n),
        None => Value::from(total),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_array(results: Vec<Pair>) -> Value {
    Value::Array(results.into_iter().map(Pair::into_value).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction(merchant: &str, reflected: &str, user_id: u64) -> Value {
        json!({"id": 1, "merchant": merchant, "amount": 1.5, "date": "2018-01-01",
               "reflected": reflected, "user_id": user_id})
    }

    #[test]
    fn test_transaction_count_mapper_and_reducer() {
        let job = transaction_count();

        assert_eq!(
            job.map(&transaction("Starbucks", "GOOD", 1)).unwrap(),
            Pair::new("Starbucks", 1)
        );
        assert!(matches!(
            job.map(&json!({"id": 3})),
            Err(JobError::MissingField { field: "merchant" })
        ));

        let group = Group(json!("Tim Hortons"), vec![json!(1), json!(1), json!(1), json!(1)]);
        assert_eq!(job.reduce(&group).unwrap(), Pair::new("Tim Hortons", 4));
    }

    #[test]
    fn test_sum_keeps_integers_integral() {
        let ints = Group(json!("k"), vec![json!(2), json!(3)]);
        assert_eq!(sum(&ints).unwrap(), json!(5));

        let floats = Group(json!("k"), vec![json!(1.5), json!(2)]);
        assert_eq!(sum(&floats).unwrap(), json!(3.5));

        let bad = Group(json!("k"), vec![json!("1")]);
        assert!(matches!(sum(&bad), Err(JobError::InvalidRecord(_))));
    }

    #[test]
    fn test_happiness_mapper_routes_records() {
        let job = happiness_percentage_per_user();

        assert_eq!(
            job.map(&transaction("Starbucks", "NEUTRAL", 2)).unwrap(),
            Pair::new(2, json!({"reflected": "NEUTRAL"}))
        );
        assert_eq!(
            job.map(&json!({"id": 1, "name": "John"})).unwrap(),
            Pair::new(1, json!({"name": "John"}))
        );
    }

    #[test]
    fn test_happiness_reducer_percentages() {
        let job = happiness_percentage_per_user();
        let group = Group(
            json!(1),
            vec![
                json!({"reflected": "GOOD"}),
                json!({"reflected": "GOOD"}),
                json!({"reflected": "NEUTRAL"}),
                json!({"reflected": "BAD"}),
                json!({"reflected": "GOOD"}),
                json!({"name": "John"}),
            ],
        );

        assert_eq!(job.reduce(&group).unwrap(), Pair::new("John", "60%"));
    }

    #[test]
    fn test_happiness_reducer_rounding_and_edges() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 0), 0);

        let job = happiness_percentage_per_user();
        let nameless = Group(json!(9), vec![json!({"reflected": "GOOD"})]);
        assert!(matches!(
            job.reduce(&nameless),
            Err(JobError::EmptyGroup { .. })
        ));

        let idle = Group(json!(3), vec![json!({"name": "Ana"})]);
        assert_eq!(job.reduce(&idle).unwrap(), Pair::new("Ana", "0%"));
    }

    #[test]
    fn test_output_shapes() {
        let results = vec![Pair::new("Starbucks", 3), Pair::new("Tim Hortons", 4)];
        assert_eq!(
            transaction_count().shape_output(results),
            json!({"merchant_transaction_count": [["Starbucks", 3], ["Tim Hortons", 4]]})
        );

        let results = vec![Pair::new("John", "60%")];
        assert_eq!(
            happiness_percentage_per_user().shape_output(results),
            json!({"user_happiness": [["John", "60%"]]})
        );
    }
}
