//! Logs a small hyperparameter search to a local TrackML server.
//!
//! Run a server on `http://localhost:3000/`, then:
//!
//! ```text
//! cargo run -p trackml --example random_search -- [model_id] [log_level]
//! ```
//!
//! Without a model id (or with `-`) a project and model are created first.
//! The log level defaults to `info`. Candidates are logged immediately, and a
//! second sweep goes through the deferred cache.

use anyhow::Context;
use trackml::logging::{self, LoggingConfig};
use trackml::{fields, FieldValue, Fields, ModelId, TrackMlConfig};

/// A forest configuration with a stand-in for its cross-validated score.
struct Candidate {
    max_depth: Option<i64>,
    max_features: i64,
    criterion: &'static str,
}

impl Candidate {
    fn parameters(&self) -> Fields {
        fields! {
            "max_depth" => self.max_depth,
            "max_features" => self.max_features,
            "criterion" => self.criterion,
        }
    }

    fn evaluate(&self) -> Fields {
        let depth_bonus = self.max_depth.map_or(0.04, |d| 0.01 * d as f64);
        let accuracy = 0.82 + depth_bonus + 0.005 * self.max_features as f64;
        fields! {
            "accuracy" => accuracy.min(0.99),
            "precision_macro" => (accuracy - 0.01).min(0.99),
        }
    }
}

fn candidates() -> Vec<Candidate> {
    let depths = [Some(3), None];
    let criteria = ["gini", "entropy"];
    (0..5)
        .map(|i| Candidate {
            max_depth: depths[i % depths.len()],
            max_features: 1 + (i as i64 * 7) % 10,
            criterion: criteria[(i / 2) % criteria.len()],
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let level = args.get(1).map_or("info", String::as_str);
    logging::init_logging(LoggingConfig::with_level(logging::parse_level(level)));

    let model_id = args
        .first()
        .filter(|raw| raw.as_str() != "-")
        .map(|raw| raw.parse::<u64>().map(ModelId::new))
        .transpose()
        .context("model id must be an integer")?;

    let mut client = trackml::connect(&TrackMlConfig {
        model_id,
        cache_size: 3,
        ..TrackMlConfig::default()
    })?;

    if client.model().is_none() {
        let project = client.new_project("Digits").await?;
        let model = client
            .new_model("Random forest", project, Some("randomized search example"))
            .await?;
        client.set_model(model);
    }

    for candidate in candidates() {
        let scores = candidate.evaluate();
        let id = client.log(candidate.parameters(), scores.clone(), None).await?;
        if let Some(FieldValue::Float(accuracy)) = scores.get("accuracy") {
            println!("experiment {id}: accuracy {accuracy:.3}");
        }
    }

    for candidate in candidates() {
        if let Some(receipt) = client
            .deferred_log(candidate.parameters(), candidate.evaluate(), None)
            .await?
        {
            println!("flushed {} deferred experiments", receipt.count);
        }
    }
    client.send_cache().await?;

    if let Some(model) = client.model() {
        println!("See results at {}models/{}", client.base_url(), model);
    }
    Ok(())
}
