//! Per-control widget registry.
//!
//! At most one live [`MultiSelect`] exists per control. Attaching to a control
//! that already has a widget returns that widget; if the call carries caller
//! data, the widget's data is replaced and it is refreshed first.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use horizon_multiselect_core::SharedTaskQueue;
use horizon_multiselect_core::logging::targets;

use super::config::ConfigOverrides;
use super::control::{ControlHandle, ControlId, Form};
use super::validation::{NoValidation, ValidationProvider};
use super::widgets::MultiSelect;
use crate::platform::LocalizationRegistry;

/// Attribute and value that mark a control for [`InstanceRegistry::attach_all`].
pub const AUTO_ATTACH_ATTR: &str = "data-toggle";
pub const AUTO_ATTACH_VALUE: &str = "bootstrap-multiselect";

/// Widgets keyed by the control they are bound to.
pub struct InstanceRegistry {
    instances: Mutex<HashMap<ControlId, Arc<MultiSelect>>>,
    queue: Option<Arc<SharedTaskQueue>>,
    validation: Arc<dyn ValidationProvider>,
    localization: Option<LocalizationRegistry>,
}

impl Default for InstanceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
            queue: None,
            validation: Arc::new(NoValidation),
            localization: None,
        }
    }

    /// Set the task queue handed to every widget built from here on.
    pub fn with_task_queue(mut self, queue: Arc<SharedTaskQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn with_validation(mut self, provider: Arc<dyn ValidationProvider>) -> Self {
        self.validation = provider;
        self
    }

    pub fn with_localization(mut self, registry: LocalizationRegistry) -> Self {
        self.localization = Some(registry);
        self
    }

    /// Initialise a widget on `control`, or return the existing one.
    pub fn attach(&self, control: &ControlHandle, overrides: Option<ConfigOverrides>) -> Arc<MultiSelect> {
        let existing = {
            let mut instances = self.instances.lock();
            instances.retain(|_, widget| !widget.is_destroyed());
            instances.get(&control.id()).cloned()
        };
        if let Some(existing) = existing {
            if let Some(data) = overrides.and_then(|o| o.data).filter(|d| !d.is_empty()) {
                tracing::debug!(target: targets::WIDGET, control = control.name(), "replacing data on existing instance");
                existing.set_data(data);
            }
            return existing;
        }

        let mut builder = MultiSelect::builder(control.clone())
            .overrides(overrides.unwrap_or_default())
            .validation(self.validation.clone());
        if let Some(queue) = &self.queue {
            builder = builder.task_queue(queue.clone());
        }
        if let Some(localization) = &self.localization {
            builder = builder.localization(localization.clone());
        }
        // Building emits signals; slots may call back into the registry.
        let widget = builder.build();
        self.instances.lock().insert(control.id(), widget.clone());
        widget
    }

    /// Attach to every control of `form` whose `data-toggle` is
    /// `bootstrap-multiselect`, in form order.
    pub fn attach_all(&self, form: &Form) -> Vec<Arc<MultiSelect>> {
        let widgets: Vec<_> = form
            .controls()
            .iter()
            .filter(|control| {
                control
                    .attribute(AUTO_ATTACH_ATTR)
                    .is_some_and(|value| value.eq_ignore_ascii_case(AUTO_ATTACH_VALUE))
            })
            .map(|control| self.attach(control, None))
            .collect();
        tracing::debug!(target: targets::WIDGET, count = widgets.len(), "auto-attached widgets");
        widgets
    }

    /// The live widget bound to `control`.
    pub fn get(&self, control: &ControlHandle) -> Option<Arc<MultiSelect>> {
        self.instances
            .lock()
            .get(&control.id())
            .filter(|widget| !widget.is_destroyed())
            .cloned()
    }

    /// Destroy and forget the widget bound to `control`.
    pub fn detach(&self, control: &ControlHandle) -> bool {
        let removed = self.instances.lock().remove(&control.id());
        match removed {
            Some(widget) => {
                widget.destroy();
                true
            }
            None => false,
        }
    }

    /// Number of live widgets.
    pub fn len(&self) -> usize {
        self.instances
            .lock()
            .values()
            .filter(|widget| !widget.is_destroyed())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OptionEntry, OptionItem};
    use crate::widget::control::{Control, NativeOption};

    fn registry() -> InstanceRegistry {
        InstanceRegistry::new().with_localization(LocalizationRegistry::new())
    }

    fn marked(name: &str) -> ControlHandle {
        Control::native_select(name)
            .with_attribute("data-toggle", "bootstrap-multiselect")
            .with_entries(vec![NativeOption::new("a", "A").into(), NativeOption::new("b", "B").into()])
            .into_handle()
    }

    #[test]
    fn test_attach_is_idempotent() {
        let registry = registry();
        let control = marked("one");
        let first = registry.attach(&control, None);
        let second = registry.attach(&control, None);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_attach_with_data_refreshes_existing() {
        let registry = registry();
        let control = marked("one");
        let widget = registry.attach(&control, None);
        widget.toggle("b");

        let again = registry.attach(
            &control,
            Some(ConfigOverrides::new().with_data(vec![
                OptionEntry::from(OptionItem::new("b", "B")),
                OptionEntry::from(OptionItem::new("c", "C")),
            ])),
        );
        assert!(Arc::ptr_eq(&widget, &again));
        assert_eq!(again.option_model().option_count(), 2);
        assert_eq!(again.selected_values(), vec!["b"]);
    }

    #[test]
    fn test_attach_all_and_detach() {
        let registry = registry();
        let form = Form::new();
        let first = marked("one");
        let plain = Control::native_select("plain").into_handle();
        let second = marked("two");
        form.add_control(&first);
        form.add_control(&plain);
        form.add_control(&second);

        let widgets = registry.attach_all(&form);
        assert_eq!(widgets.len(), 2);
        assert!(registry.get(&plain).is_none());
        assert!(!plain.is_hidden());

        assert!(registry.detach(&first));
        assert!(!first.is_hidden());
        assert!(registry.get(&first).is_none());
        assert_eq!(registry.len(), 1);
        assert!(!registry.detach(&first));
    }

    #[test]
    fn test_destroyed_instance_is_replaced() {
        let registry = registry();
        let control = marked("one");
        let first = registry.attach(&control, None);
        first.destroy();
        assert!(registry.get(&control).is_none());
        let second = registry.attach(&control, None);
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(control.is_hidden());
    }

    #[test]
    fn test_slots_can_query_registry_during_attach() {
        let registry = Arc::new(registry());
        let control = marked("one");
        let seen = Arc::new(Mutex::new(None));

        let seen_clone = seen.clone();
        let weak = Arc::downgrade(&registry);
        control.value_changed.connect(move |_| {
            if let Some(registry) = weak.upgrade() {
                *seen_clone.lock() = Some(registry.len());
            }
        });

        let widget = registry.attach(&control, None);
        assert_eq!(*seen.lock(), Some(0));
        assert!(Arc::ptr_eq(&registry.get(&control).unwrap(), &widget));
    }
}
