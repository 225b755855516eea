//! Error handling utilities

use tracing::error;

/// Handle fatal errors and exit with appropriate status code
///
/// - For `ForgeError`: shows the user message, and the source chain when verbose
/// - For other errors: shows the error and its chain when verbose
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    use crate::error::ForgeError;

    error!("Fatal error: {}", error);

    let exit_code = if let Some(forge_err) = error.downcast_ref::<ForgeError>() {
        eprintln!("{}", forge_err.user_message());

        if verbose >= 1 {
            eprintln!("\nContext Chain:\n{}", forge_err.developer_message());
        }

        forge_err.exit_code()
    } else {
        eprintln!("Error: {error}");

        if verbose >= 1 {
            eprintln!("\nError chain:");
            for (i, cause) in error.chain().enumerate() {
                eprintln!("  {}: {}", i, cause);
            }
        }

        1
    };

    std::process::exit(exit_code)
}
