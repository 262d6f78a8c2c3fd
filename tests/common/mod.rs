use rougechat::store::{ConversationStore, FileStorage};
use tempfile::TempDir;

#[allow(dead_code)]
pub fn temp_file_store() -> (ConversationStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let storage = FileStorage::with_dir(tmp.path()).expect("failed to create file storage");
    (ConversationStore::load(Box::new(storage)), tmp)
}

#[allow(dead_code)]
pub fn reopen_file_store(dir: &TempDir) -> ConversationStore {
    let storage = FileStorage::with_dir(dir.path()).expect("failed to reopen file storage");
    ConversationStore::load(Box::new(storage))
}
