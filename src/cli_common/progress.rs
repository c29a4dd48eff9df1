//! Модуль для отображения прогресса сборки

use indicatif::{ProgressBar, ProgressStyle};

use crate::docset::BuildObserver;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const BAR_TEMPLATE: &str = "{spinner:.cyan} [{bar:40.green/dim}] {pos}/{len} {wide_msg}";

/// Прогресс сборки на indicatif; скрыт, если вывод не интерактивный
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new(visible: bool) -> Self {
        let bar = if visible {
            let bar = ProgressBar::new_spinner();
            bar.set_style(style(SPINNER_TEMPLATE, ProgressStyle::default_spinner()));
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

fn style(template: &str, fallback: ProgressStyle) -> ProgressStyle {
    match fallback.clone().template(template) {
        Ok(style) => style.progress_chars("█▉▊▋▌▍▎▏ "),
        Err(e) => {
            tracing::debug!("Invalid progress template {:?}: {}", template, e);
            fallback
        }
    }
}

impl BuildObserver for ProgressObserver {
    fn phase(&self, name: &str) {
        tracing::info!("{}", name);
        if !self.bar.is_finished() {
            self.bar.set_message(name.to_string());
            self.bar.tick();
        }
    }

    fn pages_started(&self, total: usize) {
        self.bar.set_style(style(BAR_TEMPLATE, ProgressStyle::default_bar()));
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn page_finished(&self, page: &str, _tokens: usize) {
        self.bar.set_message(page.to_string());
        self.bar.inc(1);
    }

    fn pages_finished(&self) {
        self.bar.finish_and_clear();
    }
}
