//! Configuration section definitions.
//!
//! | Module      | Source                           | Purpose                         |
//! |-------------|----------------------------------|---------------------------------|
//! | `store`     | `R2_*` environment               | Object store credentials        |
//! | `transform` | `_config.yml` `cf_image_transform` | CDN transform of rendered html |
//! | `sign`      | `IMAGE_SIGN_*` environment       | HMAC signing of image urls      |

mod sign;
mod store;
mod transform;

pub use sign::SignConfig;
pub use store::{R2_REGION, StoreConfig};
pub use transform::CdnTransformConfig;
