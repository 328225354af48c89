//! Installation parameters (INSTSV). Loaded and stored whole; no field of the
//! record is interpreted here.

use crate::constants::{DLOG_MT_INSTALL_PARAMS, INSTALL_PARAMS_LEN};
use crate::error::Result;
use crate::table::catalog::{self, Revision};
use crate::table::DlogTable;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallParams {
    raw: Vec<u8>,
}

impl Default for InstallParams {
    fn default() -> Self {
        Self {
            raw: vec![0; INSTALL_PARAMS_LEN],
        }
    }
}

impl InstallParams {
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

impl DlogTable for InstallParams {
    fn decode(payload: &[u8], revision: Revision) -> Result<Self> {
        catalog::validate(DLOG_MT_INSTALL_PARAMS, revision, payload.len())?;
        Ok(Self {
            raw: payload.to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        self.raw.clone()
    }

    fn table_id(&self) -> u8 {
        DLOG_MT_INSTALL_PARAMS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;

    #[test]
    fn test_exact_size_only() {
        let payload: Vec<u8> = (0..INSTALL_PARAMS_LEN as u8).collect();
        let params = InstallParams::decode(&payload, Revision::Mtr1).unwrap();
        assert_eq!(params.encode(), payload);

        assert!(matches!(
            InstallParams::decode(&payload[1..], Revision::Mtr1),
            Err(TableError::SizeMismatch { .. })
        ));
    }
}
