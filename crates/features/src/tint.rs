use foundation::color::Color;
use streaming::FeatureItem;

/// Item view handed to the styling callbacks.
#[derive(Debug, Copy, Clone)]
pub struct ItemRef<'a> {
    pub id: &'a str,
    pub properties: &'a serde_json::Value,
}

pub type TintFn = Box<dyn Fn(&ItemRef<'_>) -> Option<String>>;
pub type HiddenFn = Box<dyn Fn(&ItemRef<'_>) -> bool>;

/// Process-wide styling callbacks, passed explicitly to tint application.
pub struct Symbology {
    /// Returns a parseable color to tint the item, or `None` for no tint.
    pub tint: TintFn,
    /// Returns `true` to hide the item.
    pub hidden: HiddenFn,
}

impl Symbology {
    pub fn new(tint: TintFn, hidden: HiddenFn) -> Self {
        Self { tint, hidden }
    }
}

impl Default for Symbology {
    fn default() -> Self {
        Self {
            tint: Box::new(|_| None),
            hidden: Box::new(|_| false),
        }
    }
}

/// Flat per-vertex styling data, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TintLayers {
    /// RGBA per vertex (4 floats each). Untinted items get transparent
    /// black, which the shader treats as "no tint".
    pub tint: Vec<f32>,
    /// One scale value per vertex slot, indexed by position within the
    /// item's vertex group. Length equals the largest `vertex_count`.
    pub z_scale: Vec<f32>,
}

/// Derives tint and z-scale layers from the styling callbacks.
///
/// Pure re-derivation over the item list: callable again at any time (a
/// re-tint) to rebuild both layers without touching geometry. A returned
/// color is applied with full opacity; an absent or unparseable one falls
/// back to transparent black. The z-scale slot for index `i` is written by
/// every item whose `vertex_count` exceeds `i`; the last item wins, which
/// preserves the source data's slot-sharing convention.
pub fn apply(items: &[FeatureItem], symbology: &Symbology) -> TintLayers {
    let mut tint = Vec::new();
    let mut z_scale: Vec<f32> = Vec::new();

    for item in items {
        let item_ref = ItemRef {
            id: &item.id,
            properties: &item.properties,
        };

        let rgba = (symbology.tint)(&item_ref)
            .and_then(|spec| Color::parse(&spec))
            .map(|color| color.opaque().to_array())
            .unwrap_or_else(|| Color::transparent().to_array());
        let scale = if (symbology.hidden)(&item_ref) { 0.0 } else { 1.0 };

        for i in 0..item.vertex_count {
            tint.extend_from_slice(&rgba);
            if i < z_scale.len() {
                z_scale[i] = scale;
            } else {
                z_scale.push(scale);
            }
        }
    }

    TintLayers { tint, z_scale }
}
