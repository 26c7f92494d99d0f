/*!

A "logger" used when the `logging` feature is off. It installs nothing but honors the level API.

*/

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
