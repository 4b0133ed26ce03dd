//! Ruin site - main entry point for generating and persisting ruins

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::{Read, Write};

use crate::catalog::RuinCatalog;
use crate::config::{ConfigError, GenerationParams, GenerationRequest};
use crate::hull_index::HullIndex;
use crate::persistence::{load_ruin, save_ruin, SaveError};
use crate::ruin::{generate_ruin, Ruin};

/// Owns the ECS world that placed entities live in, plus the current ruin.
pub struct RuinSite {
    /// ECS world containing all placed entities
    pub world: World,
    /// The most recently generated or loaded ruin
    pub ruin: Option<Ruin>,
    /// Seed of the current ruin, if known
    pub seed: Option<u64>,
    catalog: RuinCatalog,
    params: GenerationParams,
}

impl RuinSite {
    /// Create an empty site. Fails if `params` are out of range.
    pub fn new(catalog: RuinCatalog, params: GenerationParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            world: World::new(),
            ruin: None,
            seed: None,
            catalog,
            params,
        })
    }

    pub fn catalog(&self) -> &RuinCatalog {
        &self.catalog
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Replace the current ruin with a freshly generated one.
    pub fn generate(&mut self, request: &GenerationRequest, seed: u64) -> &Ruin {
        self.world.clear();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let ruin = generate_ruin(
            &mut self.world,
            request,
            &self.params,
            &self.catalog,
            &mut rng,
        );
        self.seed = Some(seed);
        self.ruin.insert(ruin)
    }

    /// Spatial index over the current ruin's hulls.
    pub fn hull_index(&self) -> Option<HullIndex> {
        self.ruin.as_ref().map(Ruin::hull_index)
    }

    /// Save the current ruin to a writer
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        let ruin = self.ruin.as_ref().ok_or(SaveError::Empty)?;
        save_ruin(writer, &self.world, ruin, self.seed)
    }

    /// Load a ruin from a reader, replacing the current world
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let loaded = load_ruin(reader)?;
        self.world = loaded.world;
        self.ruin = Some(loaded.ruin);
        self.seed = loaded.seed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Bounds, Placed};
    use glam::Vec2;
    use ruingen_logic::Rect;

    const CATALOG_JSON: &str = include_str!("../../../data/ruin_catalog.json");

    fn site() -> RuinSite {
        let catalog = RuinCatalog::from_json_str(CATALOG_JSON).unwrap();
        RuinSite::new(catalog, GenerationParams::default()).unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(Rect::new(0, 0, 2000, 2000), Vec2::new(-300.0, 900.0))
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = GenerationParams {
            vertical_split_probability: -0.1,
            ..Default::default()
        };
        assert!(RuinSite::new(RuinCatalog::default(), params).is_err());
    }

    #[test]
    fn test_save_without_ruin_fails() {
        let site = site();
        assert!(matches!(site.save(Vec::new()), Err(SaveError::Empty)));
    }

    #[test]
    fn test_regenerate_clears_world() {
        let mut site = site();
        let first = site.generate(&request(), 1).entities.len();
        assert_eq!(site.world.len() as usize, first);
        let second = site.generate(&request(), 2).entities.len();
        assert_eq!(site.world.len() as usize, second);
        assert_eq!(site.seed, Some(2));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut site = site();
        site.generate(&request(), 42);
        let original = site.ruin.clone().unwrap();

        let mut save_buffer = Vec::new();
        site.save(&mut save_buffer).expect("Save failed");

        let mut loaded_site = self::site();
        loaded_site.load(&save_buffer[..]).expect("Load failed");
        let loaded = loaded_site.ruin.as_ref().unwrap();

        assert_eq!(loaded_site.seed, Some(42));
        assert_eq!(loaded.hulls, original.hulls);
        assert_eq!(loaded.walls, original.walls);
        assert_eq!(loaded.rooms, original.rooms);
        assert_eq!(loaded.entities.len(), original.entities.len());
        for (a, b) in original.entities.iter().zip(&loaded.entities) {
            let pa = site.world.get::<&Placed>(a.entity).unwrap().prefab.clone();
            let pb = loaded_site.world.get::<&Placed>(b.entity).unwrap().prefab.clone();
            assert_eq!(pa, pb);
            let ba = *site.world.get::<&Bounds>(a.entity).unwrap();
            let bb = *loaded_site.world.get::<&Bounds>(b.entity).unwrap();
            assert_eq!(ba, bb);
        }
    }

    #[test]
    fn test_hull_index_covers_hulls() {
        let mut site = site();
        site.generate(&request(), 9);
        let index = site.hull_index().unwrap();
        let ruin = site.ruin.as_ref().unwrap();
        for (i, hull) in ruin.hulls.iter().enumerate() {
            assert!(index.query(&hull.rect).contains(&i));
        }
    }
}
