use serde::Deserialize;

#[derive(Deserialize)]
pub(crate) struct Config {
    pub(crate) url: url::Url,

    #[serde(default = "default_database_pool_size")]
    pub(crate) pool_size: u32,
}

fn default_database_pool_size() -> u32 {
    // SQLite serializes writers anyway, a handful of connections is plenty
    // for concurrent readers.
    5
}
