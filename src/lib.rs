pub mod compare;
pub mod config;
pub mod credentials;
pub mod logging;

pub use compare::{
    ClientConfig, CompareError, CompareResult, FaceCompareClient, FaceCompareClientTrait,
};
