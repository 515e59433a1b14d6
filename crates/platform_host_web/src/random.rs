//! `crypto.getRandomValues` randomness source.

use platform_host::RandomSource;

#[derive(Debug, Clone, Copy, Default)]
/// Browser CSPRNG. Native builds draw from the operating system instead.
pub struct WebRandomSource;

impl RandomSource for WebRandomSource {
    fn fill_bytes(&self, buf: &mut [u8]) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let crypto = web_sys::window()
                .ok_or_else(|| "window unavailable".to_string())?
                .crypto()
                .map_err(|e| format!("crypto unavailable: {e:?}"))?;
            // getRandomValues caps each call at 65536 bytes.
            for chunk in buf.chunks_mut(65_536) {
                crypto
                    .get_random_values_with_u8_array(chunk)
                    .map_err(|e| format!("getRandomValues failed: {e:?}"))?;
            }
            Ok(())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            platform_host::OsRandomSource.fill_bytes(buf)
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use platform_host::random_index;

    use super::*;

    #[test]
    fn native_source_produces_indices_in_range() {
        for _ in 0..32 {
            assert!(random_index(&WebRandomSource, 10).expect("index") < 10);
        }
    }
}
