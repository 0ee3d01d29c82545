#![no_main]

//! Fuzz target for service lifecycles
//!
//! Drives provide/override/invoke/health-check/shutdown sequences against a
//! few named slots and checks the registry's bookkeeping after each step.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use service_injector::{DiError, Healthcheckable, Injector, Result, Shutdownable};

#[derive(Debug, Arbitrary)]
struct Resource {
    id: u32,
    healthy: bool,
    stoppable: bool,
}

impl Healthcheckable for Resource {
    fn health_check(&self) -> Result<()> {
        if self.healthy {
            Ok(())
        } else {
            Err(DiError::msg("unhealthy"))
        }
    }
}

impl Shutdownable for Resource {
    fn shutdown(&self) -> Result<()> {
        if self.stoppable {
            Ok(())
        } else {
            Err(DiError::msg("refused"))
        }
    }
}

/// Operations against slot `slot % SLOTS`
#[derive(Debug, Arbitrary)]
enum LifecycleOp {
    ProvideValue { slot: u8, resource: Resource },
    ProvideLazy { slot: u8, fail: bool },
    OverrideValue { slot: u8, resource: Resource },
    Invoke { slot: u8 },
    HealthCheck { slot: u8 },
    Shutdown { slot: u8 },
    Remove { slot: u8 },
    HealthCheckAll,
    ShutdownAll,
    Derive,
}

const SLOTS: u8 = 4;

fn slot_name(slot: u8) -> String {
    format!("resource-{}", slot % SLOTS)
}

fuzz_target!(|ops: Vec<LifecycleOp>| {
    let mut injector = Injector::new();

    for op in ops.into_iter().take(64) {
        match op {
            LifecycleOp::ProvideValue { slot, resource } => {
                let name = slot_name(slot);
                if !injector.contains_named(&name) {
                    injector
                        .service::<Resource>()
                        .named(name.clone())
                        .healthcheckable()
                        .shutdownable()
                        .provide_value(resource);
                    assert!(injector.contains_named(&name));
                }
            }
            LifecycleOp::ProvideLazy { slot, fail } => {
                let name = slot_name(slot);
                if !injector.contains_named(&name) {
                    injector
                        .service::<Resource>()
                        .named(name)
                        .healthcheckable()
                        .shutdownable()
                        .provide(move |_| {
                            if fail {
                                return Err(DiError::msg("provider failed"));
                            }
                            Ok(Resource {
                                id: 0,
                                healthy: true,
                                stoppable: true,
                            })
                        });
                }
            }
            LifecycleOp::OverrideValue { slot, resource } => {
                let name = slot_name(slot);
                let id = resource.id;
                injector
                    .service::<Resource>()
                    .named(name.clone())
                    .healthcheckable()
                    .shutdownable()
                    .override_value(resource);
                let invoked = injector.invoke_named::<Resource>(&name);
                assert_eq!(invoked.map(|r| r.id).ok(), Some(id));
            }
            LifecycleOp::Invoke { slot } => {
                let name = slot_name(slot);
                let present = injector.contains_named(&name);
                match injector.invoke_named::<Resource>(&name) {
                    Ok(_) => {
                        assert!(present);
                        assert!(injector.list_invoked_services().contains(&name));
                    }
                    Err(err) => assert_eq!(err.is_not_found(), !present),
                }
            }
            LifecycleOp::HealthCheck { slot } => {
                let _ = injector.health_check_named(&slot_name(slot));
            }
            LifecycleOp::Shutdown { slot } => {
                let name = slot_name(slot);
                if injector.shutdown_named(&name).is_ok() {
                    assert!(!injector.list_invoked_services().contains(&name));
                }
            }
            LifecycleOp::Remove { slot } => {
                let name = slot_name(slot);
                injector.remove_named(&name);
                assert!(!injector.contains_named(&name));
            }
            LifecycleOp::HealthCheckAll => {
                let report = injector.health_check_all();
                assert_eq!(report.len(), injector.len());
            }
            LifecycleOp::ShutdownAll => {
                let _ = injector.shutdown_all();
            }
            LifecycleOp::Derive => {
                let derived = injector.derive();
                assert_eq!(
                    derived.list_provided_services(),
                    injector.list_provided_services()
                );
                injector = derived;
            }
        }

        assert!(injector.list_invoked_services().len() <= injector.len());
    }
});
