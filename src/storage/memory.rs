use crate::storage::{CookieStand, NewCookieStand, RecordStore, StoreError, StoreResult};

/// In-process record store.
///
/// Records are kept in id order, which is also insertion order since ids
/// only grow.
#[derive(Debug)]
pub struct MemoryStore {
    records: Vec<CookieStand>,
    next_id: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    fn position(&self, id: u64) -> StoreResult<usize> {
        self.records
            .binary_search_by_key(&id, |r| r.id)
            .map_err(|_| StoreError::NotFound(id))
    }

    /// Id the next create will use
    pub(crate) fn allocate_id(&self) -> StoreResult<u64> {
        if self.next_id == u64::MAX {
            return Err(StoreError::IdsExhausted);
        }
        Ok(self.next_id)
    }

    /// Insert or overwrite a record with a known id. Used when replaying a log.
    pub(crate) fn put(&mut self, record: CookieStand) {
        self.next_id = self.next_id.max(record.id.saturating_add(1));
        match self.records.binary_search_by_key(&record.id, |r| r.id) {
            Ok(pos) => self.records[pos] = record,
            Err(pos) => self.records.insert(pos, record),
        }
    }

    /// Drop a record if present. Used when replaying a log.
    pub(crate) fn remove(&mut self, id: u64) {
        self.next_id = self.next_id.max(id.saturating_add(1));
        if let Ok(pos) = self.position(id) {
            self.records.remove(pos);
        }
    }
}

impl RecordStore for MemoryStore {
    fn create(&mut self, new: NewCookieStand) -> StoreResult<CookieStand> {
        new.validate()?;
        let record = new.into_record(self.allocate_id()?);
        self.next_id += 1;
        self.records.push(record.clone());
        Ok(record)
    }

    fn get(&self, id: u64) -> StoreResult<CookieStand> {
        let pos = self.position(id)?;
        Ok(self.records[pos].clone())
    }

    fn list(&self) -> Vec<CookieStand> {
        self.records.clone()
    }

    fn update(&mut self, id: u64, new: NewCookieStand) -> StoreResult<CookieStand> {
        let pos = self.position(id)?;
        new.validate()?;
        let record = new.into_record(id);
        self.records[pos] = record.clone();
        Ok(record)
    }

    fn delete(&mut self, id: u64) -> StoreResult<()> {
        let pos = self.position(id)?;
        self.records.remove(pos);
        Ok(())
    }

    fn count(&self) -> usize {
        self.records.len()
    }
}
