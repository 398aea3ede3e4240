//! eartune - resolve and apply device equalization profiles
//!
//! Copyright (C) 2025 Pierre Aubert pierre(at)spinorama(dot)org
//!
//! This program is free software: you can redistribute it and/or modify
//! it under the terms of the GNU General Public License as published by
//! the Free Software Foundation, either version 3 of the License, or
//! (at your option) any later version.
//!
//! This program is distributed in the hope that it will be useful,
//! but WITHOUT ANY WARRANTY; without even the implied warranty of
//! MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//! GNU General Public License for more details.
//!
//! You should have received a copy of the GNU General Public License
//! along with this program.  If not, see <https://www.gnu.org/licenses/>.
//!
//! Typed representations of the three EQ forms found in the measurement
//! database (parametric, graphic and fixed-band) together with their
//! on-disk text formats and the conversions between them.

mod error;
mod fixed;
mod graphic;
mod parametric;

pub use error::ProfileError;
pub use fixed::{FIXED_BAND_FREQUENCIES, FIXED_BAND_Q, FixedBandEq};
pub use graphic::{GraphicEq, GraphicEqBand};
pub use parametric::{ParametricEq, ParametricEqBand, PeqFilterType};
