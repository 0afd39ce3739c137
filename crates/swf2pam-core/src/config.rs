use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Fixed atlas canvas edge used by the game's resource pipeline.
pub const DEFAULT_PAGE_SIZE: u32 = 4096;

/// Art scale PvZ2 animations are authored for (1200 -> 1536 resolution).
pub const DEFAULT_IMAGE_SCALE: f32 = 0.78125;

/// Layout of the generated resource metadata.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceFormat {
    Sen,
    Spc,
}

impl FromStr for ResourceFormat {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sen" => Ok(Self::Sen),
            "spc" => Ok(Self::Spc),
            _ => Err(()),
        }
    }
}

impl ResourceFormat {
    /// Folder name used under the output directory.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ResourceFormat::Sen => "SEN",
            ResourceFormat::Spc => "SPC",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Resample bitmaps for art scaling before packing.
    pub scale_images: bool,
    /// Divisor applied to bitmap sizes when `scale_images` is on.
    #[serde(default = "default_image_scale")]
    pub image_scale_factor: f32,
    /// Queue every decoded bitmap for export as its own PNG.
    #[serde(default)]
    pub export_images: bool,
    /// Base path for image resources, e.g. `zombie` -> `images/full/zombie/<doc>`.
    pub res_base_path: String,
    /// Resource group the animation belongs to.
    pub res_group_name: String,
    #[serde(default = "default_resource_format")]
    pub resource_format: ResourceFormat,
    /// Edge length of each square atlas canvas.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            scale_images: false,
            image_scale_factor: default_image_scale(),
            export_images: false,
            res_base_path: String::new(),
            res_group_name: "Group".into(),
            resource_format: default_resource_format(),
            page_size: default_page_size(),
        }
    }
}

impl ConvertConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - The image scale factor is zero, negative or not finite
    /// - The page size is zero or larger than `DEFAULT_PAGE_SIZE`
    /// - The resource base path or group name is empty
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::PamError;

        if !self.image_scale_factor.is_finite() || self.image_scale_factor <= 0.0 {
            return Err(PamError::InvalidConfig(format!(
                "image_scale_factor must be a positive number, got {}",
                self.image_scale_factor
            )));
        }
        if self.page_size == 0 || self.page_size > DEFAULT_PAGE_SIZE {
            return Err(PamError::InvalidConfig(format!(
                "page_size must be between 1 and {DEFAULT_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        if self.res_base_path.trim().is_empty() {
            return Err(PamError::InvalidConfig(
                "res_base_path must not be empty".into(),
            ));
        }
        if self.res_group_name.trim().is_empty() {
            return Err(PamError::InvalidConfig(
                "res_group_name must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Create a fluent builder for `ConvertConfig`.
    pub fn builder() -> ConvertConfigBuilder {
        ConvertConfigBuilder::new()
    }
}

fn default_image_scale() -> f32 {
    DEFAULT_IMAGE_SCALE
}
fn default_resource_format() -> ResourceFormat {
    ResourceFormat::Sen
}
fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Builder for `ConvertConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct ConvertConfigBuilder {
    cfg: ConvertConfig,
}

impl ConvertConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: ConvertConfig::default(),
        }
    }
    pub fn scale_images(mut self, v: bool) -> Self {
        self.cfg.scale_images = v;
        self
    }
    pub fn image_scale_factor(mut self, v: f32) -> Self {
        self.cfg.image_scale_factor = v;
        self
    }
    pub fn export_images(mut self, v: bool) -> Self {
        self.cfg.export_images = v;
        self
    }
    pub fn res_base_path(mut self, v: impl Into<String>) -> Self {
        self.cfg.res_base_path = v.into();
        self
    }
    pub fn res_group_name(mut self, v: impl Into<String>) -> Self {
        self.cfg.res_group_name = v.into();
        self
    }
    pub fn resource_format(mut self, v: ResourceFormat) -> Self {
        self.cfg.resource_format = v;
        self
    }
    pub fn page_size(mut self, v: u32) -> Self {
        self.cfg.page_size = v;
        self
    }
    pub fn build(self) -> ConvertConfig {
        self.cfg
    }
}
