use anyhow::Result;

/// Return the current Unix epoch in seconds.
pub fn now_epoch_secs() -> Result<u64> {
    Ok(u64::try_from(publish_stamp())?)
}

/// Wall-clock seconds used to stamp `publishTime`.
pub fn publish_stamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_and_publish_share_one_clock() {
        let before = publish_stamp();
        let audit = now_epoch_secs().expect("epoch");
        let after = publish_stamp();
        assert!(before as u64 <= audit && audit <= after as u64);
    }
}
