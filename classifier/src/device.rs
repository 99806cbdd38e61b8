use candle_core::{Device, Result};

/// Picks the accelerator compiled in through the `cuda` / `metal` features,
/// falling back to the CPU. `force_cpu` skips the probe entirely.
pub fn select_device(force_cpu: bool) -> Result<Device> {
    if force_cpu {
        log::info!("Running on CPU (forced)");
        return Ok(Device::Cpu);
    }

    #[cfg(feature = "cuda")]
    {
        let device = Device::cuda_if_available(0)?;
        if device.is_cuda() {
            log::info!("Running on CUDA device 0");
            return Ok(device);
        }
    }

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                log::info!("Running on Metal device 0");
                return Ok(device);
            }
            Err(e) => log::warn!("Metal unavailable: {}", e),
        }
    }

    log::info!("Running on CPU");
    Ok(Device::Cpu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_cpu() {
        assert!(select_device(true).unwrap().is_cpu());
    }
}
