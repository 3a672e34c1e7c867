// builders + hooks + the training driver
pub mod builders;
pub mod hooks;
pub mod logging;
pub mod plot;
pub mod trainer;
pub mod utils;
