use crate::StrError;
use std::collections::HashMap;

/// Defines the identifier of a grain (feature)
pub type GrainId = usize;

/// Defines the lookup interface of a grain tracking service
///
/// A grain tracker associates each order parameter (phase-field variable) of an element
/// with the grain (feature) currently represented by that variable and holds per-grain data
/// such as elasticity tensors or orientations.
///
/// Implementations are shared read-only by all integration points (possibly across threads).
pub trait GrainDataProvider<T>: Send + Sync {
    /// Returns the grain ids of an element indexed by order parameter
    ///
    /// `None` means that the order parameter does not represent any grain in this element.
    /// The returned vector may be shorter than the number of order parameters; the missing
    /// entries are treated as `None`.
    fn var_to_feature(&self, element_id: usize) -> Vec<Option<GrainId>>;

    /// Returns the data of a grain
    fn grain_data(&self, grain_id: GrainId) -> Result<&T, StrError>;
}

/// Implements an in-memory grain tracker
///
/// The element-to-grain maps are given explicitly; elements without an explicit map use the
/// default map.
#[derive(Clone, Debug)]
pub struct GrainTracker<T> {
    /// Holds the feature maps of elements (element_id → grain ids by order parameter)
    features: HashMap<usize, Vec<Option<GrainId>>>,

    /// Holds the feature map used by elements without an explicit map
    default_features: Vec<Option<GrainId>>,

    /// Holds the per-grain data
    data: HashMap<GrainId, T>,
}

impl<T> GrainTracker<T> {
    /// Allocates a new (empty) instance
    pub fn new() -> Self {
        GrainTracker {
            features: HashMap::new(),
            default_features: Vec::new(),
            data: HashMap::new(),
        }
    }

    /// Sets the feature map of an element
    pub fn set_element_features(&mut self, element_id: usize, features: &[Option<GrainId>]) -> &mut Self {
        self.features.insert(element_id, features.to_vec());
        self
    }

    /// Sets the feature map used by elements without an explicit map
    pub fn set_default_features(&mut self, features: &[Option<GrainId>]) -> &mut Self {
        self.default_features = features.to_vec();
        self
    }

    /// Sets the data of a grain
    pub fn set_grain_data(&mut self, grain_id: GrainId, data: T) -> &mut Self {
        self.data.insert(grain_id, data);
        self
    }

    /// Returns the number of grains with data
    pub fn n_grain(&self) -> usize {
        self.data.len()
    }

    /// Allocates a new tracker with the same feature maps and transformed per-grain data
    pub fn map_data<U, F>(&self, mut f: F) -> Result<GrainTracker<U>, StrError>
    where
        F: FnMut(&T) -> Result<U, StrError>,
    {
        let mut data = HashMap::with_capacity(self.data.len());
        for (id, value) in &self.data {
            data.insert(*id, f(value)?);
        }
        Ok(GrainTracker {
            features: self.features.clone(),
            default_features: self.default_features.clone(),
            data,
        })
    }
}

impl<T: Send + Sync> GrainDataProvider<T> for GrainTracker<T> {
    fn var_to_feature(&self, element_id: usize) -> Vec<Option<GrainId>> {
        match self.features.get(&element_id) {
            Some(features) => features.clone(),
            None => self.default_features.clone(),
        }
    }

    fn grain_data(&self, grain_id: GrainId) -> Result<&T, StrError> {
        self.data.get(&grain_id).ok_or("grain data is not available")
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
