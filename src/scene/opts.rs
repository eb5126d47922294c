use crate::foundation::core::Rect2D;
use crate::foundation::error::{SceneError, SceneResult};

/// Display resolution the scene is authored for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Resolution {
    /// 1280x720.
    #[default]
    HD,
    /// 1920x1080.
    FHD,
}

impl Resolution {
    /// Scene width in pixels.
    pub fn width(self) -> f64 {
        match self {
            Self::HD => 1280.0,
            Self::FHD => 1920.0,
        }
    }

    /// Scene height in pixels.
    pub fn height(self) -> f64 {
        match self {
            Self::HD => 720.0,
            Self::FHD => 1080.0,
        }
    }

    /// Full scene rectangle.
    pub fn scene_rect(self) -> Rect2D {
        Rect2D::new(0.0, 0.0, self.width(), self.height())
    }

    /// Pick the HD or FHD variant of a metric.
    pub fn pick(self, hd: f64, fhd: f64) -> f64 {
        match self {
            Self::HD => hd,
            Self::FHD => fhd,
        }
    }
}

/// Runtime options shared by every node of a [`crate::SceneGraph`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneOpts {
    /// Authoring resolution.
    pub resolution: Resolution,
    /// Tolerance, in pixels, below which layout positions and sizes count as unchanged.
    pub layout_epsilon: f64,
    /// Label line spacing override; defaults to 8 (HD) or 12 (FHD).
    pub label_line_spacing: Option<f64>,
}

impl Default for SceneOpts {
    fn default() -> Self {
        Self {
            resolution: Resolution::HD,
            layout_epsilon: 0.25,
            label_line_spacing: None,
        }
    }
}

impl SceneOpts {
    /// Parse and validate options from JSON.
    pub fn from_json_str(s: &str) -> SceneResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| SceneError::validation(format!("scene options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Check option ranges.
    pub fn validate(&self) -> SceneResult<()> {
        if !self.layout_epsilon.is_finite() || self.layout_epsilon < 0.0 {
            return Err(SceneError::validation(
                "layout_epsilon must be a finite, non-negative number",
            ));
        }
        if self.label_line_spacing.is_some_and(|s| !s.is_finite()) {
            return Err(SceneError::validation("label_line_spacing must be finite"));
        }
        Ok(())
    }

    /// Effective label line spacing.
    pub fn line_spacing(&self) -> f64 {
        self.label_line_spacing
            .unwrap_or_else(|| self.resolution.pick(8.0, 12.0))
    }

    /// Point size of a system font at this resolution.
    ///
    /// Unknown names get the medium size.
    pub fn system_font_size(&self, name: &str) -> f64 {
        let (hd, fhd) = match name.to_ascii_lowercase().as_str() {
            "smallestsystemfont" | "smallestboldsystemfont" => (18.0, 27.0),
            "smallsystemfont" | "smallboldsystemfont" => (22.0, 33.0),
            "largesystemfont" | "largeboldsystemfont" => (30.0, 45.0),
            "extralargesystemfont" | "extralargeboldsystemfont" => (36.0, 54.0),
            _ => (24.0, 36.0),
        };
        self.resolution.pick(hd, fhd)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/opts.rs"]
mod tests;
