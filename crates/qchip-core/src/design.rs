use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::component::{self, Component, ComponentGeometry, ComponentId, DesignContext};
use crate::error::{CoreError, Result};
use crate::layer::{Layer, LayerStack};
use crate::options::Options;
use crate::pin::Pin;
use crate::qgeometry::{QGeometry, QGeometryTables};
use crate::units::Variables;

/// How components should draw details that only matter for simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Fabrication layout.
    #[default]
    Layout,
    /// Adds junction launch pads and notches used by simulation ports.
    Simulate,
}

/// A component instance held by a design.
#[derive(Debug)]
pub struct ComponentRecord {
    pub id: ComponentId,
    pub name: String,
    pub short_name: String,
    /// User overrides, merged over the component defaults on every build.
    pub overrides: Options,
    pub pins: Vec<Pin>,
    component: Box<dyn Component>,
}

impl ComponentRecord {
    /// Defaults with the user overrides applied.
    pub fn resolved_options(&self) -> Options {
        self.component.default_options().merged(&self.overrides)
    }

    pub fn component(&self) -> &dyn Component {
        self.component.as_ref()
    }

    pub fn pin(&self, name: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.name == name)
    }
}

/// The host that owns component instances and their generated geometry.
#[derive(Debug)]
pub struct Design {
    /// Design identifier.
    pub id: Uuid,
    /// Design name.
    pub name: String,
    /// Named lengths referenced by option strings.
    variables: Variables,
    /// Known layers.
    layer_stack: LayerStack,
    render_mode: RenderMode,
    /// Components in insertion order.
    components: Vec<ComponentRecord>,
    qgeometry: QGeometryTables,
}

impl Design {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            variables: Variables::with_defaults(),
            layer_stack: LayerStack::with_defaults(),
            render_mode: RenderMode::Layout,
            components: Vec::new(),
            qgeometry: QGeometryTables::new(),
        }
    }

    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn layer_stack(&self) -> &LayerStack {
        &self.layer_stack
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    fn context(&self) -> DesignContext<'_> {
        DesignContext {
            variables: &self.variables,
            layers: &self.layer_stack,
            render_mode: self.render_mode,
        }
    }

    fn make(
        &self,
        component: &dyn Component,
        id: ComponentId,
        name: &str,
        overrides: &Options,
    ) -> Result<ComponentGeometry> {
        component::build(component, id, name, overrides, self.context())
    }

    fn commit(&mut self, index: usize, geometry: ComponentGeometry) {
        let record = &mut self.components[index];
        self.qgeometry.replace_component(&record.id, geometry.rows);
        record.pins = geometry.pins;
    }

    fn index_of(&self, id: &ComponentId) -> Result<usize> {
        self.components
            .iter()
            .position(|c| &c.id == id)
            .ok_or(CoreError::UnknownComponent(*id))
    }

    // ── Component management ─────────────────────────────────────────

    /// Build `component` with `overrides` and add it under a unique `name`.
    /// Nothing is added if the build fails.
    pub fn add_component<C>(&mut self, name: &str, component: C, overrides: Options) -> Result<ComponentId>
    where
        C: Component + 'static,
    {
        if self.component_by_name(name).is_some() {
            return Err(CoreError::DuplicateComponent(name.to_string()));
        }
        let id = Uuid::new_v4();
        let geometry = self.make(&component, id, name, &overrides)?;
        let short_name = component.metadata().short_name;
        log::info!(
            "Added {} '{}' with {} geometry rows and {} pins",
            short_name,
            name,
            geometry.rows.len(),
            geometry.pins.len()
        );
        self.components.push(ComponentRecord {
            id,
            name: name.to_string(),
            short_name,
            overrides,
            pins: Vec::new(),
            component: Box::new(component),
        });
        self.commit(self.components.len() - 1, geometry);
        Ok(id)
    }

    /// Merge `overrides` into a component's options and rebuild it. On
    /// failure the component keeps its previous options and geometry.
    pub fn update_options(&mut self, id: &ComponentId, overrides: &Options) -> Result<()> {
        let index = self.index_of(id)?;
        let record = &self.components[index];
        let merged = record.overrides.merged(overrides);
        let geometry = self.make(record.component(), record.id, &record.name, &merged)?;
        self.components[index].overrides = merged;
        self.commit(index, geometry);
        Ok(())
    }

    /// Set a design variable and rebuild every component. On failure the
    /// previous value is restored.
    pub fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        let previous = self.variables.get(name).map(str::to_string);
        self.variables.set(name, value);
        if let Err(err) = self.rebuild() {
            match previous {
                Some(old) => self.variables.set(name, &old),
                None => {
                    self.variables.remove(name);
                }
            }
            return Err(err);
        }
        Ok(())
    }

    /// Switch the render mode and rebuild every component. On failure the
    /// previous mode is restored.
    pub fn set_render_mode(&mut self, mode: RenderMode) -> Result<()> {
        let previous = std::mem::replace(&mut self.render_mode, mode);
        if let Err(err) = self.rebuild() {
            self.render_mode = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Add or replace a layer and rebuild every component. On failure the
    /// previous layer stack is restored.
    pub fn add_layer(&mut self, layer: Layer) -> Result<()> {
        let previous = self.layer_stack.clone();
        self.layer_stack.add_layer(layer);
        if let Err(err) = self.rebuild() {
            self.layer_stack = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Rebuild every component from its current options. Either all
    /// components rebuild or none are changed.
    pub fn rebuild(&mut self) -> Result<()> {
        let built = self
            .components
            .iter()
            .map(|r| self.make(r.component(), r.id, &r.name, &r.overrides))
            .collect::<Result<Vec<_>>>()?;
        for (index, geometry) in built.into_iter().enumerate() {
            self.commit(index, geometry);
        }
        log::info!("Rebuilt {} components", self.components.len());
        Ok(())
    }

    pub fn delete_component(&mut self, id: &ComponentId) -> Result<()> {
        let index = self.index_of(id)?;
        let record = self.components.remove(index);
        let removed = self.qgeometry.remove_component(&record.id);
        log::info!("Deleted '{}' and {} geometry rows", record.name, removed);
        Ok(())
    }

    pub fn component(&self, id: &ComponentId) -> Option<&ComponentRecord> {
        self.components.iter().find(|c| &c.id == id)
    }

    pub fn component_by_name(&self, name: &str) -> Option<&ComponentRecord> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn components(&self) -> impl Iterator<Item = &ComponentRecord> {
        self.components.iter()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    // ── Geometry and pins ────────────────────────────────────────────

    pub fn qgeometry(&self) -> &QGeometryTables {
        &self.qgeometry
    }

    pub fn component_rows<'a>(&'a self, id: &'a ComponentId) -> Vec<&'a QGeometry> {
        self.qgeometry.for_component(id).collect()
    }

    pub fn pins(&self, id: &ComponentId) -> Option<&[Pin]> {
        self.component(id).map(|c| c.pins.as_slice())
    }

    // ── Serialization ────────────────────────────────────────────────

    pub fn snapshot(&self) -> DesignSnapshot {
        DesignSnapshot {
            id: self.id,
            name: self.name.clone(),
            render_mode: self.render_mode,
            variables: self.variables.clone(),
            layer_stack: self.layer_stack.clone(),
            components: self
                .components
                .iter()
                .map(|c| ComponentSnapshot {
                    id: c.id,
                    name: c.name.clone(),
                    short_name: c.short_name.clone(),
                    options: c.resolved_options(),
                    pins: c.pins.clone(),
                })
                .collect(),
            qgeometry: self.qgeometry.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

/// Serializable view of a built design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignSnapshot {
    pub id: Uuid,
    pub name: String,
    pub render_mode: RenderMode,
    pub variables: Variables,
    pub layer_stack: LayerStack,
    pub components: Vec<ComponentSnapshot>,
    pub qgeometry: QGeometryTables,
}

impl DesignSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSnapshot {
    pub id: ComponentId,
    pub name: String,
    pub short_name: String,
    pub options: Options,
    pub pins: Vec<Pin>,
}
