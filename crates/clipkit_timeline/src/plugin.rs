// SPDX-License-Identifier: MIT OR Apache-2.0
//! Process-wide tween plugins.
//!
//! A plugin can replace the interpolated value of a property before it is
//! applied. Plugins are installed once per process and consulted in install
//! order; the first one that returns a value wins.

use crate::keyframe::PropValue;
use crate::target::TweenTarget;
use parking_lot::RwLock;
use std::sync::Arc;

/// Hook into property interpolation
pub trait TweenPlugin: Send + Sync {
    /// Stable plugin name, used to keep installation idempotent
    fn name(&self) -> &'static str;

    /// Return a replacement for the value of `prop` at `ratio` between `start` and `end`
    fn change(
        &self,
        target: &TweenTarget,
        prop: &str,
        start: &PropValue,
        end: &PropValue,
        ratio: f32,
    ) -> Option<PropValue>;
}

static PLUGINS: RwLock<Vec<Arc<dyn TweenPlugin>>> = parking_lot::const_rwlock(Vec::new());

/// Install a plugin. Returns `false` if a plugin with the same name is already installed.
pub fn install_plugin(plugin: Arc<dyn TweenPlugin>) -> bool {
    let mut plugins = PLUGINS.write();
    if plugins.iter().any(|p| p.name() == plugin.name()) {
        return false;
    }
    tracing::debug!(plugin = plugin.name(), "installed tween plugin");
    plugins.push(plugin);
    true
}

/// Whether a plugin with this name is installed
pub fn is_installed(name: &str) -> bool {
    PLUGINS.read().iter().any(|p| p.name() == name)
}

/// Ask the installed plugins for a replacement value
pub(crate) fn change(
    target: &TweenTarget,
    prop: &str,
    start: &PropValue,
    end: &PropValue,
    ratio: f32,
) -> Option<PropValue> {
    PLUGINS
        .read()
        .iter()
        .find_map(|plugin| plugin.change(target, prop, start, end, ratio))
}
