use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub data_path: String,
    pub model_trees: usize,
    pub model_seed: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists (for development)
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid PORT value: {}", e))?;

        let data_path = env::var("DATA_PATH")
            .unwrap_or_else(|_| "diabetes_prediction_dataset.csv".to_string());

        let model_trees = env::var("MODEL_TREES")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid MODEL_TREES value: {}", e))?;

        let model_seed = env::var("MODEL_SEED")
            .unwrap_or_else(|_| "42".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid MODEL_SEED value: {}", e))?;

        Ok(Config {
            port,
            data_path,
            model_trees,
            model_seed,
        })
    }
}
