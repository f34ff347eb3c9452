#![forbid(unsafe_code)]

//! Assembling a console from options and a catalog.

use phosphor_runtime::{BorderSet, Kernel, KernelConfig, Pid, Process, Surface, Viewport};
use tracing::warn;

use crate::apps;
use crate::catalog::Catalog;
use crate::cli::Opts;
use crate::shell::{Registry, RegistryEntry, Shell};

/// Phosphor green.
pub const ACCENT: &str = "#33ff33";

/// Kernel configuration for `opts`, with the catalog's ticker messages.
#[must_use]
pub fn kernel_config(opts: &Opts, catalog: &Catalog) -> KernelConfig {
    KernelConfig {
        width: opts.width,
        rows: opts.rows,
        ticker_messages: catalog.ticker.clone(),
        ticker_speed: opts.ticker_speed,
        border: Some(if opts.ascii {
            BorderSet::ASCII
        } else {
            BorderSet::SINGLE
        }),
        accent: Some(ACCENT.to_string()),
        ..KernelConfig::default()
    }
}

/// Resolve catalog targets to pids with `find`.
///
/// Entries whose target is not a known process keep a `None` target.
pub fn resolve_registry(catalog: &Catalog, find: impl Fn(&str) -> Option<Pid>) -> Registry {
    let entries = catalog
        .entries
        .iter()
        .map(|entry| {
            let target = entry.target.as_deref().and_then(|name| {
                let pid = find(name);
                if pid.is_none() {
                    warn!(entry = %entry.name, target = name, "catalog target not found");
                }
                pid
            });
            RegistryEntry::new(&entry.name, &entry.type_tag, &entry.description, target)
        })
        .collect();
    Registry::new(entries)
}

/// Spawn `apps`, then the menu over `catalog`, and make the menu home.
///
/// The kernel is returned un-booted.
pub fn build_kernel<S: Surface>(
    config: KernelConfig,
    catalog: &Catalog,
    apps: Vec<Box<dyn Process>>,
    surface: S,
) -> Kernel<S> {
    let mut kernel = Kernel::new(config, surface);
    for app in apps {
        kernel.spawn_boxed(app);
    }
    let registry = resolve_registry(catalog, |name| kernel.find(name));
    let menu = kernel.spawn(Shell::new(registry));
    kernel.set_home(menu);
    kernel
}

/// The stock console: bundled applications and the given catalog.
pub fn console<S: Surface>(opts: &Opts, catalog: &Catalog, surface: S) -> Kernel<S> {
    let config = kernel_config(opts, catalog);
    let page = Viewport::new(config.width, config.rows);
    build_kernel(config, catalog, apps::builtin(page), surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use phosphor_runtime::MemorySurface;
    use tracing_test::traced_test;

    #[test]
    fn builtin_catalog_resolves_all_but_arcade() {
        let catalog = Catalog::builtin();
        let kernel = console(&Opts::default(), &catalog, MemorySurface::new());
        assert_eq!(kernel.process_count(), 5);
        assert_eq!(kernel.home(), kernel.find(Shell::NAME));

        let registry = resolve_registry(&catalog, |name| kernel.find(name));
        let targets: Vec<_> = registry.entries().iter().map(|e| e.target.is_some()).collect();
        assert_eq!(targets, [true, true, true, true, false]);
    }

    #[test]
    fn config_follows_opts() {
        let opts = Opts {
            width: 44,
            rows: 9,
            ascii: true,
            ..Opts::default()
        };
        let config = kernel_config(&opts, &Catalog::builtin());
        assert_eq!(config.width, 44);
        assert_eq!(config.rows, 9);
        assert_eq!(config.border, Some(BorderSet::ASCII));
        assert_eq!(config.ticker_messages, Catalog::builtin().ticker);
    }

    #[test]
    #[traced_test]
    fn unknown_target_is_logged() {
        let catalog = Catalog::builtin();
        let registry = resolve_registry(&catalog, |_| None);
        assert!(registry.entries().iter().all(|e| e.target.is_none()));
        assert!(logs_contain("catalog target not found"));
        assert!(logs_contain("DASHBOARD"));
    }
}
