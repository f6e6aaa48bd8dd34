use crate::math::*;
use crate::solid::{ParameterRecord, SolidParameters};
use crate::voxel::VoxelVolume;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The persisted result of a run: the voxelized stress along with the parameters that produced
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressVolumeBundle {
    pub voxel_grid_size: usize,
    /// `voxel_grid_size³` values, voxel `(i, j, k)` at `i * g * g + j * g + k`.
    pub volume: Vec<T>,
    pub parameters: ParameterRecord,
}

/// How a bundle is encoded on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    MessagePack,
}

impl Format {
    /// `.json` files are JSON, everything else is MessagePack.
    pub fn from_path(path: &Path) -> Format {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Format::Json,
            _ => Format::MessagePack,
        }
    }
}

impl StressVolumeBundle {
    pub fn new(volume: &VoxelVolume, params: &SolidParameters) -> Self {
        StressVolumeBundle {
            voxel_grid_size: volume.size(),
            volume: volume.as_slice().to_vec(),
            parameters: params.to_record(),
        }
    }

    pub fn encode(&self, format: Format) -> eyre::Result<Vec<u8>> {
        Ok(match format {
            Format::Json => serde_json::to_vec(self)?,
            Format::MessagePack => rmp_serde::to_vec_named(self)?,
        })
    }

    pub fn decode(bytes: &[u8], format: Format) -> eyre::Result<Self> {
        let bundle: StressVolumeBundle = match format {
            Format::Json => serde_json::from_slice(bytes)?,
            Format::MessagePack => rmp_serde::from_read_ref(bytes)?,
        };
        let g = bundle.voxel_grid_size;
        if bundle.volume.len() != g * g * g {
            return Err(eyre::eyre!(
                "Volume has {} values but voxel_grid_size is {}",
                bundle.volume.len(),
                g
            ));
        }
        Ok(bundle)
    }

    pub fn write(&self, path: &Path) -> eyre::Result<()> {
        let bytes = self.encode(Format::from_path(path))?;
        std::fs::write(path, bytes)
            .wrap_err_with(|| format!("Failed to write stress volume: {:?}", path))
    }

    pub fn read(path: &Path) -> eyre::Result<Self> {
        let bytes = std::fs::read(path)
            .wrap_err_with(|| format!("Failed to read stress volume: {:?}", path))?;
        Self::decode(&bytes, Format::from_path(path))
    }
}
