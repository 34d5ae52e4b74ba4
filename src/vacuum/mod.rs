pub mod archive;
pub mod config;
pub mod matcher;
pub mod output;
pub mod result_error;
pub mod runner;
pub mod sweeper;
pub mod validate;

macro_rules! function_path {
    () => {
        concat!(module_path!(), "::", function_name!(), " ", file!(), ":", line!())
    };
}

pub(crate) use function_path;
