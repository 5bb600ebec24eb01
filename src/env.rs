use reqwest::Url;
use serde::{
    de::{DeserializeOwned, Error},
    Deserialize, Deserializer,
};
use std::{fmt, str};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Network {
    Mainnet,
    Shasta,
    Nile,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let str = match &self {
            Network::Mainnet => "mainnet",
            Network::Shasta => "shasta",
            Network::Nile => "nile",
        };
        write!(f, "{}", str)
    }
}

impl str::FromStr for Network {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Network::Mainnet),
            "shasta" => Ok(Network::Shasta),
            "nile" => Ok(Network::Nile),
            _ => Err(format!(
                "network present but not mainnet, shasta or nile: {}",
                s
            )),
        }
    }
}

pub trait ToApiUrl {
    fn to_api_url(&self) -> Url;
}

impl ToApiUrl for Network {
    fn to_api_url(&self) -> Url {
        let url = match *self {
            Network::Mainnet => "https://api.trongrid.io/",
            Network::Shasta => "https://api.shasta.trongrid.io/",
            Network::Nile => "https://nile.trongrid.io/",
        };
        Url::parse(url).expect("static network url to be valid")
    }
}

pub fn deserialize_urls<'de, D>(deserializer: D) -> Result<Vec<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Url::parse(s).map_err(Error::custom))
        .collect()
}

pub fn get_app_config<T: DeserializeOwned>() -> T {
    match envy::from_env::<T>() {
        Ok(config) => config,
        Err(err) => {
            error!("failed to parse config: {}", err);
            std::process::exit(1);
        }
    }
}
