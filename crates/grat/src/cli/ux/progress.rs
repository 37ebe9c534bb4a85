use indicatif::{ProgressBar, ProgressStyle};

/// A spinner shown until the first output of a turn arrives.
#[derive(Debug)]
pub struct GenerationSpinner {
    spinner: ProgressBar,
}

impl GenerationSpinner {
    pub fn new(msg: String) -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.set_message(msg);
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));

        Self { spinner }
    }

    /// Stops the spinner and clears it from the terminal.
    pub fn clear(&self) {
        self.spinner.finish_and_clear();
    }
}
