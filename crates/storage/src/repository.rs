use crate::error::StorageError;
use crate::seed::sample_trades;
use chrono::Local;
use core_types::Trade;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The storage boundary of the journal.
///
/// `list_trades` returns trades newest first; `add_trade` prepends.
pub trait TradeRepository {
    fn list_trades(&self) -> Result<Vec<Trade>, StorageError>;

    fn add_trade(&mut self, trade: Trade) -> Result<(), StorageError>;

    /// Removes the trade with `id`, failing with `NotFound` if there is none.
    fn delete_trade(&mut self, id: Uuid) -> Result<Trade, StorageError>;

    fn replace_all(&mut self, trades: Vec<Trade>) -> Result<(), StorageError>;

    /// Adds a batch as if each trade had been added in turn, so the last one ends up first.
    fn add_trades(&mut self, batch: Vec<Trade>) -> Result<usize, StorageError> {
        let count = batch.len();
        let mut trades: Vec<Trade> = batch.into_iter().rev().collect();
        trades.extend(self.list_trades()?);
        self.replace_all(trades)?;
        Ok(count)
    }

    /// Discards the journal and re-seeds it with the demo trades.
    fn reset(&mut self) -> Result<Vec<Trade>, StorageError> {
        let fresh = sample_trades(&Local::now())?;
        self.replace_all(fresh.clone())?;
        Ok(fresh)
    }
}

/// A journal kept as one pretty-printed JSON array on disk.
///
/// The file is read once on open and rewritten in full after every mutation. The
/// in-memory list only changes once the new file is in place.
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    trades: Vec<Trade>,
}

impl JsonFileRepository {
    /// Opens the journal at `path`, seeding it with the demo trades if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if path.exists() {
            let data = fs::read_to_string(&path)?;
            let trades: Vec<Trade> = serde_json::from_str(&data)?;
            tracing::debug!(path = %path.display(), count = trades.len(), "Loaded journal");
            return Ok(Self { path, trades });
        }

        tracing::info!(path = %path.display(), "No journal found, seeding sample trades");
        let trades = sample_trades(&Local::now())?;
        write_journal(&path, &trades)?;
        Ok(Self { path, trades })
    }

    fn commit(&mut self, trades: Vec<Trade>) -> Result<(), StorageError> {
        write_journal(&self.path, &trades)?;
        self.trades = trades;
        Ok(())
    }
}

/// Writes `trades` to a temporary file next to `path`, then renames it over `path`.
fn write_journal(path: &Path, trades: &[Trade]) -> Result<(), StorageError> {
    let data = serde_json::to_vec_pretty(trades)?;

    // Ensure parent directory exists
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl TradeRepository for JsonFileRepository {
    fn list_trades(&self) -> Result<Vec<Trade>, StorageError> {
        Ok(self.trades.clone())
    }

    fn add_trade(&mut self, trade: Trade) -> Result<(), StorageError> {
        tracing::info!(id = %trade.id, symbol = %trade.symbol, pnl = %trade.pnl, "Adding trade");
        let mut trades = Vec::with_capacity(self.trades.len() + 1);
        trades.push(trade);
        trades.extend(self.trades.iter().cloned());
        self.commit(trades)
    }

    fn delete_trade(&mut self, id: Uuid) -> Result<Trade, StorageError> {
        let index = self
            .trades
            .iter()
            .position(|t| t.id == id)
            .ok_or(StorageError::NotFound(id))?;
        let mut trades = self.trades.clone();
        let removed = trades.remove(index);
        self.commit(trades)?;
        tracing::info!(%id, symbol = %removed.symbol, "Deleted trade");
        Ok(removed)
    }

    fn replace_all(&mut self, trades: Vec<Trade>) -> Result<(), StorageError> {
        tracing::info!(count = trades.len(), "Replacing journal contents");
        self.commit(trades)
    }
}

/// A journal that lives only as long as the value does.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepository {
    trades: Vec<Trade>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trades(trades: Vec<Trade>) -> Self {
        Self { trades }
    }
}

impl TradeRepository for InMemoryRepository {
    fn list_trades(&self) -> Result<Vec<Trade>, StorageError> {
        Ok(self.trades.clone())
    }

    fn add_trade(&mut self, trade: Trade) -> Result<(), StorageError> {
        self.trades.insert(0, trade);
        Ok(())
    }

    fn delete_trade(&mut self, id: Uuid) -> Result<Trade, StorageError> {
        let index = self
            .trades
            .iter()
            .position(|t| t.id == id)
            .ok_or(StorageError::NotFound(id))?;
        Ok(self.trades.remove(index))
    }

    fn replace_all(&mut self, trades: Vec<Trade>) -> Result<(), StorageError> {
        self.trades = trades;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{NewTrade, TradeType};
    use rust_decimal_macros::dec;

    fn trade(symbol: &str) -> Trade {
        Trade::open(NewTrade {
            symbol: symbol.to_string(),
            trade_type: TradeType::Long,
            entry_price: dec!(100),
            exit_price: dec!(110),
            quantity: dec!(1),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_missing_file_is_seeded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal").join("trades.json");

        let repo = JsonFileRepository::open(&path).unwrap();
        assert_eq!(repo.list_trades().unwrap().len(), 8);
        assert!(path.exists());
    }

    #[test]
    fn test_mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.json");

        let mut repo = JsonFileRepository::open(&path).unwrap();
        repo.replace_all(vec![]).unwrap();
        repo.add_trade(trade("AAA")).unwrap();
        repo.add_trade(trade("BBB")).unwrap();

        let reopened = JsonFileRepository::open(&path).unwrap();
        let symbols: Vec<_> =
            reopened.list_trades().unwrap().into_iter().map(|t| t.symbol).collect();
        assert_eq!(symbols, vec!["BBB", "AAA"]);
    }

    #[test]
    fn test_delete_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.json");
        let mut repo = JsonFileRepository::open(&path).unwrap();

        let victim = repo.list_trades().unwrap()[3].clone();
        let removed = repo.delete_trade(victim.id).unwrap();
        assert_eq!(removed, victim);

        let reopened = JsonFileRepository::open(&path).unwrap();
        let trades = reopened.list_trades().unwrap();
        assert_eq!(trades.len(), 7);
        assert!(trades.iter().all(|t| t.id != victim.id));
    }

    #[test]
    fn test_delete_unknown_id() {
        let mut repo = InMemoryRepository::with_trades(vec![trade("AAA")]);
        let id = Uuid::new_v4();
        assert!(matches!(
            repo.delete_trade(id),
            Err(StorageError::NotFound(missing)) if missing == id
        ));
        assert_eq!(repo.list_trades().unwrap().len(), 1);
    }

    #[test]
    fn test_batch_add_prepends_in_reverse() {
        let mut repo = InMemoryRepository::with_trades(vec![trade("OLD")]);
        let added = repo.add_trades(vec![trade("R1"), trade("R2"), trade("R3")]).unwrap();
        assert_eq!(added, 3);

        let symbols: Vec<_> = repo.list_trades().unwrap().into_iter().map(|t| t.symbol).collect();
        assert_eq!(symbols, vec!["R3", "R2", "R1", "OLD"]);
    }

    #[test]
    fn test_reset_reseeds() {
        let mut repo = InMemoryRepository::new();
        repo.add_trade(trade("AAA")).unwrap();

        let fresh = repo.reset().unwrap();
        assert_eq!(fresh.len(), 8);
        assert_eq!(repo.list_trades().unwrap(), fresh);
    }

    #[test]
    fn test_failed_write_leaves_journal_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let journal_dir = dir.path().join("journal");
        let path = journal_dir.join("trades.json");
        let mut repo = JsonFileRepository::open(&path).unwrap();
        let before = repo.list_trades().unwrap();

        // Swap the journal directory for a plain file so every write fails.
        fs::remove_dir_all(&journal_dir).unwrap();
        fs::write(&journal_dir, "not a directory").unwrap();

        assert!(repo.add_trade(trade("AAA")).is_err());
        assert!(repo.delete_trade(before[0].id).is_err());
        assert!(repo.replace_all(vec![]).is_err());
        assert_eq!(repo.list_trades().unwrap(), before);
    }

    #[test]
    fn test_rewrite_leaves_no_stray_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.json");
        let mut repo = JsonFileRepository::open(&path).unwrap();
        repo.add_trade(trade("AAA")).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(JsonFileRepository::open(&path).unwrap().list_trades().unwrap().len(), 9);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonFileRepository::open(&path), Err(StorageError::Json(_))));
    }
}
