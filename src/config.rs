//! Explicit configuration for the factories and algorithms: which storage new images use, how
//! many worker threads to run and how images are extended past their edges. Nothing here is
//! global; a configuration is loaded (or built) and handed to the objects that need it.

use crate::img::{ImgFactory, StorageStrategy};
use crate::multithreading::default_num_threads;
use crate::outofbounds::OutOfBoundsFactory;
use crate::types::NativeType;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImgConfig {
    pub storage: StorageStrategy,

    /// The number of worker threads, all available threads if not set
    pub num_threads: Option<usize>,

    pub out_of_bounds: OutOfBoundsFactory,
}

impl ImgConfig {
    /// Parse a configuration from JSON. Missing fields take their default values.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndimg::config::ImgConfig;
    /// use ndimg::img::StorageStrategy;
    ///
    /// let config = ImgConfig::from_json_str(r#"{"storage": {"type": "dynamic"}}"#).unwrap();
    /// assert_eq!(config.storage, StorageStrategy::Dynamic);
    /// assert_eq!(config.num_threads, None);
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        log::debug!("parsed configuration {config:?}");
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// A factory for elements of type `T` using the configured storage.
    pub fn factory<T: NativeType>(&self) -> Result<ImgFactory<T>> {
        ImgFactory::new(self.storage.clone())
    }

    /// The configured thread count, resolving "not set" to all available threads.
    pub fn threads(&self) -> usize {
        self.num_threads.unwrap_or_else(default_num_threads).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{Algorithm, DirectConvolution, Kernel, MultiThreaded, OutputAlgorithm};
    use crate::img::ArrayImg;
    use crate::ImgError;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ImgConfig::default();
        assert_eq!(config.storage, StorageStrategy::Array);
        assert_eq!(config.out_of_bounds, OutOfBoundsFactory::Value { value: 0.0 });
        assert!(config.threads() >= 1);
    }

    #[test]
    fn full_document() -> Result<()> {
        let text = r#"{
            "storage": {"type": "cell", "cell_size": [8, 8]},
            "num_threads": 3,
            "out_of_bounds": {"type": "mirror_exp_window", "decay_rate": 0.25}
        }"#;
        let config = ImgConfig::from_json_str(text)?;
        assert_eq!(config.threads(), 3);
        assert_eq!(
            config.out_of_bounds,
            OutOfBoundsFactory::MirrorExpWindow { decay_rate: 0.25 }
        );

        let round_trip = ImgConfig::from_json_str(&config.to_json_string()?)?;
        assert_eq!(round_trip, config);
        Ok(())
    }

    #[test]
    fn malformed_document() {
        let result = ImgConfig::from_json_str(r#"{"storage": {"type": "sparse"}}"#);
        assert!(matches!(result, Err(ImgError::Config(_))));
    }

    #[test]
    fn load_from_file() -> Result<()> {
        let path = std::env::temp_dir().join(format!("ndimg-config-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path)?;
        file.write_all(br#"{"num_threads": 2, "out_of_bounds": {"type": "periodic"}}"#)?;
        drop(file);

        let config = ImgConfig::load(&path)?;
        std::fs::remove_file(&path)?;
        assert_eq!(config.num_threads, Some(2));
        assert_eq!(config.out_of_bounds, OutOfBoundsFactory::Periodic);

        assert!(matches!(
            ImgConfig::load(&path),
            Err(ImgError::Io(_))
        ));
        Ok(())
    }

    #[test]
    fn drives_an_algorithm() -> Result<()> {
        let config = ImgConfig::from_json_str(
            r#"{"storage": {"type": "cell", "cell_size": [2]}, "num_threads": 2,
                "out_of_bounds": {"type": "mirror_double"}}"#,
        )?;
        let img = ArrayImg::from_vec(&[4], vec![1.0f64, 2.0, 3.0, 4.0])?;
        let mut conv = DirectConvolution::new(&img, vec![Kernel::from_vec(&[3], vec![1.0, 0.0, 0.0])?])
            .with_out_of_bounds(config.out_of_bounds)
            .with_factory(config.factory::<f64>()?);
        conv.set_num_threads(config.threads());
        assert!(conv.process(), "{}", conv.error_message());

        // out[x] = in[x - 1], with -1 mirrored onto 1
        let out = conv.into_result().unwrap();
        assert_eq!(out.iter().copied().collect::<Vec<_>>(), vec![2.0, 1.0, 2.0, 3.0]);
        Ok(())
    }
}
