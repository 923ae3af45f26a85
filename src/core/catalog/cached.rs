//! Catalog wrapper with expiring caches for slow lookups

use super::{Catalog, ProfessorRating, SectionQuery, StoreError};
use crate::core::cache::TtlCache;
use crate::core::models::{CourseCode, CourseRecord, DegreeRequirement, SectionId, SectionRecord};
use crate::core::requisites::{PrereqGroup, PrereqMap};
use crate::debug;
use std::cell::RefCell;
use std::time::{Duration, Instant};

/// Caches professor ratings and prerequisite lookups of an inner catalog
///
/// Entries expire after the configured TTL and are purged whenever a lookup
/// misses; [`CachedCatalog::clear`] drops everything at once.
#[derive(Debug)]
pub struct CachedCatalog<C> {
    inner: C,
    ratings: RefCell<TtlCache<String, Option<ProfessorRating>>>,
    prerequisites: RefCell<TtlCache<CourseCode, Vec<PrereqGroup>>>,
}

impl<C: Catalog> CachedCatalog<C> {
    /// Wrap `inner` with caches of the given TTL
    #[must_use]
    pub fn new(inner: C, ttl: Duration) -> Self {
        Self {
            inner,
            ratings: RefCell::new(TtlCache::new(ttl)),
            prerequisites: RefCell::new(TtlCache::new(ttl)),
        }
    }

    /// Wrapped catalog
    #[must_use]
    pub const fn inner(&self) -> &C {
        &self.inner
    }

    /// Number of stored entries, expired ones not yet purged included
    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.ratings.borrow().len() + self.prerequisites.borrow().len()
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.ratings.borrow_mut().clear();
        self.prerequisites.borrow_mut().clear();
    }

    /// Rating lookup against an explicit clock
    ///
    /// # Errors
    /// Returns an error if the inner catalog fails on a cache miss
    pub fn professor_rating_at(
        &self,
        name: &str,
        now: Instant,
    ) -> Result<Option<ProfessorRating>, StoreError> {
        let key = name.trim().to_lowercase();
        if let Some(hit) = self.ratings.borrow().get(&key, now) {
            return Ok(hit.clone());
        }
        let rating = self.inner.get_professor_rating(name)?;
        let mut ratings = self.ratings.borrow_mut();
        let purged = ratings.purge_expired(now);
        if purged > 0 {
            debug!("Purged {purged} expired rating(s)");
        }
        ratings.insert(key, rating.clone(), now);
        Ok(rating)
    }

    /// Prerequisite lookup against an explicit clock
    ///
    /// Courses without prerequisite data are cached too, so repeated misses
    /// do not reach the inner catalog.
    ///
    /// # Errors
    /// Returns an error if the inner catalog fails on a cache miss
    pub fn prerequisites_at(
        &self,
        codes: &[CourseCode],
        now: Instant,
    ) -> Result<PrereqMap, StoreError> {
        let mut found = PrereqMap::new();
        let mut misses = Vec::new();
        {
            let cache = self.prerequisites.borrow();
            for code in codes {
                match cache.get(code, now) {
                    Some(groups) if !groups.is_empty() => {
                        found.insert(code.clone(), groups.clone());
                    }
                    Some(_) => {}
                    None => misses.push(code.clone()),
                }
            }
        }

        if !misses.is_empty() {
            debug!("Prerequisite cache miss for {} courses", misses.len());
            let fetched = self.inner.get_prerequisites(&misses)?;
            let mut cache = self.prerequisites.borrow_mut();
            cache.purge_expired(now);
            for code in misses {
                let groups = fetched.get(&code).cloned().unwrap_or_default();
                if !groups.is_empty() {
                    found.insert(code.clone(), groups.clone());
                }
                cache.insert(code, groups, now);
            }
        }

        Ok(found)
    }
}

impl<C: Catalog> Catalog for CachedCatalog<C> {
    fn get_sections(&self, query: &SectionQuery) -> Result<Vec<SectionRecord>, StoreError> {
        self.inner.get_sections(query)
    }

    fn get_section(&self, id: &SectionId) -> Result<Option<SectionRecord>, StoreError> {
        self.inner.get_section(id)
    }

    fn get_prerequisites(&self, codes: &[CourseCode]) -> Result<PrereqMap, StoreError> {
        self.prerequisites_at(codes, Instant::now())
    }

    fn get_course(&self, code: &CourseCode) -> Result<Option<CourseRecord>, StoreError> {
        self.inner.get_course(code)
    }

    fn get_professor_rating(&self, name: &str) -> Result<Option<ProfessorRating>, StoreError> {
        self.professor_rating_at(name, Instant::now())
    }

    fn get_requirements(&self) -> Result<Vec<DegreeRequirement>, StoreError> {
        self.inner.get_requirements()
    }
}
