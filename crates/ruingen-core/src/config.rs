//! Generation parameters and per-ruin requests.

use glam::Vec2;
use ruingen_logic::bsp::SplitParams;
use ruingen_logic::corridor::CorridorParams;
use ruingen_logic::Rect;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be within 0..=1, got {value}")]
    Probability { field: &'static str, value: f32 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} range is inverted: min {min} > max {max}")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
}

/// Tunables shared by every ruin generated with one engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Room Splitter passes over the leaf set.
    pub iterations: u32,
    pub vertical_split_probability: f32,
    pub min_split_width: i32,
    pub min_split_height: i32,
    /// Split position is drawn from `[ratio, 1 - ratio]` of the split axis.
    pub min_division_ratio: f32,
    /// Per-axis leaf shrink ratio range.
    pub room_scale_min: Vec2,
    pub room_scale_max: Vec2,
    pub corridor_width_min: i32,
    pub corridor_width_max: i32,
    pub door_open_probability: f32,
    pub gap_thickness: i32,
    /// Smallest wall span worth placing an entity on.
    pub placement_grid: i32,
    pub max_displacement_iterations: u32,
    pub displacement_step: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            iterations: 3,
            vertical_split_probability: 0.5,
            min_split_width: 400,
            min_split_height: 400,
            min_division_ratio: 0.35,
            room_scale_min: Vec2::new(0.6, 0.6),
            room_scale_max: Vec2::new(0.8, 0.8),
            corridor_width_min: 80,
            corridor_width_max: 80,
            door_open_probability: 0.2,
            gap_thickness: 32,
            placement_grid: 16,
            max_displacement_iterations: 32,
            displacement_step: 16.0,
        }
    }
}

fn check_probability(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { field, value })
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn check_range(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { field, min, max })
    }
}

impl GenerationParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("vertical_split_probability", self.vertical_split_probability)?;
        check_probability("door_open_probability", self.door_open_probability)?;
        if !(0.0..0.5).contains(&self.min_division_ratio) {
            return Err(ConfigError::Probability {
                field: "min_division_ratio",
                value: self.min_division_ratio,
            });
        }
        check_positive("min_split_width", self.min_split_width as f32)?;
        check_positive("min_split_height", self.min_split_height as f32)?;
        check_positive("corridor_width_min", self.corridor_width_min as f32)?;
        check_positive("gap_thickness", self.gap_thickness as f32)?;
        check_positive("placement_grid", self.placement_grid as f32)?;
        check_positive("displacement_step", self.displacement_step)?;
        check_positive("room_scale_min.x", self.room_scale_min.x)?;
        check_positive("room_scale_min.y", self.room_scale_min.y)?;
        check_range(
            "corridor_width",
            self.corridor_width_min as f32,
            self.corridor_width_max as f32,
        )?;
        check_range("room_scale.x", self.room_scale_min.x, self.room_scale_max.x)?;
        check_range("room_scale.y", self.room_scale_min.y, self.room_scale_max.y)?;
        Ok(())
    }

    pub fn split_params(&self) -> SplitParams {
        SplitParams {
            iterations: self.iterations,
            vertical_split_probability: self.vertical_split_probability,
            min_width: self.min_split_width,
            min_height: self.min_split_height,
            min_division_ratio: self.min_division_ratio,
            scale_min: self.room_scale_min,
            scale_max: self.room_scale_max,
        }
    }

    pub fn corridor_params(&self) -> CorridorParams {
        CorridorParams {
            width_min: self.corridor_width_min,
            width_max: self.corridor_width_max,
        }
    }
}

/// Where and how one ruin should be generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub area: Rect,
    /// Nearest point of the surrounding cave network; picks the entrance.
    pub path_point: Vec2,
    pub mirror: bool,
}

impl GenerationRequest {
    pub fn new(area: Rect, path_point: Vec2) -> Self {
        Self {
            area,
            path_point,
            mirror: false,
        }
    }

    pub fn mirrored(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }
}
