use serde::{Deserialize, Serialize};

/// A unique layer identifier.
pub type LayerId = u32;

/// A fabrication layer that component geometry can be drawn on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    /// Whether subtractive geometry on this layer cuts a ground plane.
    pub ground_plane: bool,
    pub description: String,
}

impl Layer {
    pub fn new(id: LayerId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            ground_plane: true,
            description: String::new(),
        }
    }

    pub fn without_ground_plane(mut self) -> Self {
        self.ground_plane = false;
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }
}

/// The layers known to a design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Base metal on layer 1 and junction metal on layer 2.
    pub fn with_defaults() -> Self {
        let mut stack = Self::new();
        stack.add_layer(Layer::new(1, "metal").with_description("Base superconducting film"));
        stack.add_layer(
            Layer::new(2, "junction")
                .without_ground_plane()
                .with_description("Josephson junction evaporation"),
        );
        stack
    }

    /// Add a layer, replacing any existing layer with the same id.
    pub fn add_layer(&mut self, layer: Layer) {
        match self.layers.iter_mut().find(|l| l.id == layer.id) {
            Some(existing) => *existing = layer,
            None => self.layers.push(layer),
        }
    }

    pub fn get_layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.get_layer(id).is_some()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stack() {
        let stack = LayerStack::default();
        assert_eq!(stack.layer_count(), 2);
        assert!(stack.get_layer(1).unwrap().ground_plane);
        assert!(!stack.get_layer(2).unwrap().ground_plane);
        assert!(!stack.contains(7));
    }

    #[test]
    fn test_add_layer_replaces() {
        let mut stack = LayerStack::new();
        stack.add_layer(Layer::new(5, "first"));
        stack.add_layer(Layer::new(5, "second"));
        assert_eq!(stack.layer_count(), 1);
        assert_eq!(stack.get_layer(5).unwrap().name, "second");
    }
}
