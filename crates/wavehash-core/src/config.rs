use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::wavelet::{max_level, Wavelet};

/// Which subbands of the coarsest decomposition level feed the feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubbandMode {
    /// Approximation only (most stable)
    #[serde(rename = "LL")]
    Ll,

    /// Approximation + horizontal detail
    #[serde(rename = "LL_LH")]
    LlLh,

    /// Approximation + vertical detail
    #[serde(rename = "LL_HL")]
    LlHl,

    /// Approximation + horizontal + vertical detail. The diagonal band is
    /// left out: it is the noisiest band and destabilizes the hash.
    #[serde(rename = "LL_LH_HL")]
    LlLhHl,

    /// Approximation + all three detail bands
    #[serde(rename = "ALL")]
    All,
}

impl SubbandMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ll => "LL",
            Self::LlLh => "LL_LH",
            Self::LlHl => "LL_HL",
            Self::LlLhHl => "LL_LH_HL",
            Self::All => "ALL",
        }
    }
}

impl FromStr for SubbandMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "LL" => Ok(Self::Ll),
            "LL_LH" => Ok(Self::LlLh),
            "LL_HL" => Ok(Self::LlHl),
            "LL_LH_HL" => Ok(Self::LlLhHl),
            "ALL" => Ok(Self::All),
            _ => Err(Error::InvalidConfiguration(format!(
                "unknown subband mode '{}', expected one of: LL, LL_LH, LL_HL, LL_LH_HL, ALL",
                s
            ))),
        }
    }
}

impl fmt::Display for SubbandMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholding policy used to turn features into bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantMethod {
    /// bit = value > median
    Median,

    /// bit = value > mean
    Mean,

    /// Robust median ± k·MAD band, the band itself maps to `mid_policy`
    Ternary,

    /// Parity of the value rounded to a multiple of `delta`
    UniformStep,
}

impl QuantMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Median => "median",
            Self::Mean => "mean",
            Self::Ternary => "ternary",
            Self::UniformStep => "uniform_step",
        }
    }
}

impl FromStr for QuantMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "median" => Ok(Self::Median),
            "mean" => Ok(Self::Mean),
            "ternary" => Ok(Self::Ternary),
            "uniform_step" => Ok(Self::UniformStep),
            _ => Err(Error::InvalidConfiguration(format!(
                "unknown quantization method '{}', expected one of: median, mean, ternary, uniform_step",
                s
            ))),
        }
    }
}

impl fmt::Display for QuantMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized image size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl FromStr for ImageSize {
    type Err = Error;

    /// Parses `WxH`, e.g. `256x256`
    fn from_str(s: &str) -> Result<Self> {
        let invalid =
            || Error::InvalidConfiguration(format!("invalid image size '{}', expected WxH", s));
        let lower = s.to_lowercase();
        let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
        let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
        Ok(Self { width, height })
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Method-specific quantization parameters (`k`, `mid_policy`, `delta`)
pub type QuantParams = BTreeMap<String, f64>;

/// Configuration for wavelet hashing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashConfig {
    /// Wavelet family name (haar, db2, db4, sym2, coif1, ...)
    pub wavelet: String,

    /// Number of DWT decomposition levels (>= 1)
    pub level: usize,

    /// Subband selection
    pub subband_mode: SubbandMode,

    /// Bit quantization policy
    pub quant_method: QuantMethod,

    /// Output hash length in bits
    pub hash_bits: usize,

    /// Size every image is normalized to before decomposition
    pub image_size: ImageSize,

    /// Extra parameters for the quantization method
    #[serde(default)]
    pub quant_params: QuantParams,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            wavelet: "haar".to_string(),
            level: 2,
            subband_mode: SubbandMode::Ll,
            quant_method: QuantMethod::Median,
            hash_bits: 256,
            image_size: ImageSize::new(256, 256),
            quant_params: QuantParams::new(),
        }
    }
}

impl fmt::Display for HashConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WaveletHash({}, L{}, {}, {}, {}bits)",
            self.wavelet, self.level, self.subband_mode, self.quant_method, self.hash_bits
        )
    }
}

/// Partial override applied on top of a [`HashConfig`]; `None` keeps the base value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HashConfigOverrides {
    pub wavelet: Option<String>,
    pub level: Option<usize>,
    pub subband_mode: Option<SubbandMode>,
    pub quant_method: Option<QuantMethod>,
    pub hash_bits: Option<usize>,
    pub image_size: Option<ImageSize>,
    /// Replaces the whole parameter map when present
    pub quant_params: Option<QuantParams>,
}

impl HashConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl HashConfig {
    fn preset(wavelet: &str, level: usize, quant_method: QuantMethod) -> Self {
        Self {
            wavelet: wavelet.to_string(),
            level,
            quant_method,
            ..Self::default()
        }
    }

    pub fn haar_l2_median() -> Self {
        Self::preset("haar", 2, QuantMethod::Median)
    }

    pub fn db2_l2_median() -> Self {
        Self::preset("db2", 2, QuantMethod::Median)
    }

    pub fn db4_l3_median() -> Self {
        Self::preset("db4", 3, QuantMethod::Median)
    }

    pub fn sym2_l2_mean() -> Self {
        Self::preset("sym2", 2, QuantMethod::Mean)
    }

    /// Merge `overrides` field by field; an override always wins
    pub fn with_overrides(&self, overrides: &HashConfigOverrides) -> Self {
        Self {
            wavelet: overrides.wavelet.clone().unwrap_or_else(|| self.wavelet.clone()),
            level: overrides.level.unwrap_or(self.level),
            subband_mode: overrides.subband_mode.unwrap_or(self.subband_mode),
            quant_method: overrides.quant_method.unwrap_or(self.quant_method),
            hash_bits: overrides.hash_bits.unwrap_or(self.hash_bits),
            image_size: overrides.image_size.unwrap_or(self.image_size),
            quant_params: overrides
                .quant_params
                .clone()
                .unwrap_or_else(|| self.quant_params.clone()),
        }
    }

    /// Hashes made with compatible configs can be compared. Everything except
    /// `quant_params` has to match exactly.
    pub fn is_compatible_with(&self, other: &HashConfig) -> bool {
        self.wavelet.eq_ignore_ascii_case(&other.wavelet)
            && self.level == other.level
            && self.subband_mode == other.subband_mode
            && self.quant_method == other.quant_method
            && self.hash_bits == other.hash_bits
            && self.image_size == other.image_size
    }

    /// Resolve the wavelet name
    pub fn wavelet(&self) -> Result<Wavelet> {
        self.wavelet.parse()
    }

    /// Look up a quantization parameter, falling back to `default`
    pub fn quant_param(&self, key: &str, default: f64) -> f64 {
        self.quant_params.get(key).copied().unwrap_or(default)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            Error::InvalidConfiguration(format!("Failed to open config file: {}", e))
        })?;

        let config: HashConfig = serde_json::from_reader(file).map_err(|e| {
            Error::InvalidConfiguration(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref()).map_err(|e| {
            Error::InvalidConfiguration(format!("Failed to create config file: {}", e))
        })?;

        serde_json::to_writer_pretty(file, self)?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let wavelet = self.wavelet()?;

        if self.level == 0 {
            return Err(Error::InvalidConfiguration(
                "Decomposition level must be at least 1".to_string(),
            ));
        }

        if self.hash_bits == 0 {
            return Err(Error::InvalidConfiguration(
                "Hash length must be at least 1 bit".to_string(),
            ));
        }

        if self.image_size.width == 0 || self.image_size.height == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "Image size must be non-zero, got {}",
                self.image_size
            )));
        }

        let longest = self.image_size.width.max(self.image_size.height) as usize;
        let deepest = max_level(longest, wavelet.filter_len());
        if self.level > deepest {
            return Err(Error::InvalidConfiguration(format!(
                "Decomposition level {} exceeds the maximum of {} for {} at {}",
                self.level, deepest, wavelet, self.image_size
            )));
        }

        match self.quant_method {
            QuantMethod::Ternary => {
                let k = self.quant_param("k", 1.0);
                if !k.is_finite() || k < 0.0 {
                    return Err(Error::InvalidConfiguration(format!(
                        "Ternary k must be a finite non-negative number, got {}",
                        k
                    )));
                }
                let mid_policy = self.quant_param("mid_policy", 0.0);
                if mid_policy != 0.0 && mid_policy != 1.0 {
                    return Err(Error::InvalidConfiguration(format!(
                        "Ternary mid_policy must be 0 or 1, got {}",
                        mid_policy
                    )));
                }
            }
            QuantMethod::UniformStep => {
                let delta = self.quant_param("delta", 5.0);
                if !delta.is_finite() || delta <= 0.0 {
                    return Err(Error::InvalidConfiguration(format!(
                        "Uniform step delta must be positive, got {}",
                        delta
                    )));
                }
            }
            QuantMethod::Median | QuantMethod::Mean => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = HashConfig::default();
        assert_eq!(config.wavelet, "haar");
        assert_eq!(config.level, 2);
        assert_eq!(config.subband_mode, SubbandMode::Ll);
        assert_eq!(config.quant_method, QuantMethod::Median);
        assert_eq!(config.hash_bits, 256);
        assert_eq!(config.image_size, ImageSize::new(256, 256));
        assert!(config.quant_params.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            HashConfig::db4_l3_median().to_string(),
            "WaveletHash(db4, L3, LL, median, 256bits)"
        );
    }

    #[test]
    fn test_parse_modes_and_methods() {
        assert_eq!("ll_lh_hl".parse::<SubbandMode>().unwrap(), SubbandMode::LlLhHl);
        assert_eq!("All".parse::<SubbandMode>().unwrap(), SubbandMode::All);
        assert_eq!("UNIFORM_STEP".parse::<QuantMethod>().unwrap(), QuantMethod::UniformStep);

        assert!(matches!(
            "LL_HH".parse::<SubbandMode>(),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            "otsu".parse::<QuantMethod>(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_parse_image_size() {
        assert_eq!("128x64".parse::<ImageSize>().unwrap(), ImageSize::new(128, 64));
        assert!("128".parse::<ImageSize>().is_err());
        assert!("axb".parse::<ImageSize>().is_err());
    }

    #[test]
    fn test_overrides_win() {
        let base = HashConfig::default();
        let mut params = QuantParams::new();
        params.insert("delta".to_string(), 2.0);

        let overrides = HashConfigOverrides {
            wavelet: Some("db2".to_string()),
            quant_method: Some(QuantMethod::UniformStep),
            quant_params: Some(params.clone()),
            ..Default::default()
        };

        let resolved = base.with_overrides(&overrides);
        assert_eq!(resolved.wavelet, "db2");
        assert_eq!(resolved.quant_method, QuantMethod::UniformStep);
        assert_eq!(resolved.quant_params, params);
        // Untouched fields come from the base
        assert_eq!(resolved.level, base.level);
        assert_eq!(resolved.hash_bits, base.hash_bits);

        assert!(HashConfigOverrides::default().is_empty());
        assert_eq!(base.with_overrides(&HashConfigOverrides::default()), base);
    }

    #[test]
    fn test_compatibility_ignores_quant_params() {
        let a = HashConfig::default();
        let mut b = HashConfig::default();
        b.quant_params.insert("k".to_string(), 2.0);
        assert!(a.is_compatible_with(&b));

        b.hash_bits = 128;
        assert!(!a.is_compatible_with(&b));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = HashConfig::default();
        config.level = 0;
        assert!(config.validate().is_err());

        for level in [9, usize::MAX / 2] {
            let mut config = HashConfig::default();
            config.level = level;
            assert!(matches!(config.validate(), Err(Error::InvalidConfiguration(_))));
        }

        let mut config = HashConfig::default();
        config.wavelet = "mexican_hat".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidConfiguration(_))));

        let mut config = HashConfig::default();
        config.quant_method = QuantMethod::UniformStep;
        config.quant_params.insert("delta".to_string(), 0.0);
        assert!(config.validate().is_err());

        let mut config = HashConfig::default();
        config.quant_method = QuantMethod::Ternary;
        config.quant_params.insert("mid_policy".to_string(), 2.0);
        assert!(config.validate().is_err());

        let mut config = HashConfig::default();
        config.image_size = ImageSize::new(0, 32);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wavehash.json");

        let mut config = HashConfig::sym2_l2_mean();
        config.subband_mode = SubbandMode::LlLh;
        config.save_to_file(&path).unwrap();

        let loaded = HashConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"LL_LH\""));
        assert!(json.contains("\"mean\""));
    }
}
