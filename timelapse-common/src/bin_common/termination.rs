use signal_hook::{consts::signal::*, iterator::Signals, low_level};

use crate::utils::cancel::CancelToken;

/// Turns SIGINT and SIGTERM into a cancellation of `token`. A second signal falls back to
/// the default handler, i.e., kills the process.
#[derive(Clone, Debug)]
pub struct Cookie {
    token: CancelToken,
}

/// Whether the `count`th signal, counted from 1, should kill the process.
fn is_hard(count: usize) -> bool {
    count >= 2
}

impl Cookie {
    pub fn new(token: CancelToken) -> Result<Self, std::io::Error> {
        let mut signals = Signals::new([SIGINT, SIGTERM])?;

        {
            let token = token.clone();
            std::thread::Builder::new()
                .name("signals".to_string())
                .spawn(move || {
                    let mut count = 0;
                    for signal in signals.forever() {
                        count += 1;
                        if is_hard(count) {
                            log::warn!("Termination signal received again, exiting now");
                            let _ = low_level::emulate_default_handler(signal);
                        } else {
                            log::warn!("Termination signal received, stopping");
                            token.cancel();
                        }
                    }
                })?;
        }

        Ok(Self { token })
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}
