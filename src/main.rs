use remcache::app::startup::startup;
use remcache::core::error_handling::log_error_with_context;

fn main() {
    if let Err(error) = startup() {
        log_error_with_context(&error, "Running remote cache server");
        std::process::exit(1);
    }
}
