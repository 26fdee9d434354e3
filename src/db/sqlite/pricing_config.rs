//! Pricing schedule row

use crate::error::Result;
use crate::pricing::config::{
    BaseFees, DiamondMargins, MakingCharges, MakingRate, Margin, PricingConfig,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT_CONFIG: &str = "SELECT lt1ct_multiplier, lt1ct_flat_addition, gt1ct_multiplier, gt1ct_flat_addition,
        base_fee1, base_fee2, making_lt2g_rate, making_gt2g_rate, making_multiplier,
        gst_rate, last_updated, updated_by
 FROM pricing_config WHERE id = 1";

fn from_row(row: &Row<'_>) -> rusqlite::Result<PricingConfig> {
    let last_updated: String = row.get(10)?;
    let last_updated = DateTime::parse_from_rfc3339(&last_updated)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(PricingConfig {
        diamond_margins: DiamondMargins {
            less_than_1ct: Margin {
                multiplier: row.get(0)?,
                flat_addition: row.get(1)?,
            },
            greater_than_1ct: Margin {
                multiplier: row.get(2)?,
                flat_addition: row.get(3)?,
            },
            base_fees: BaseFees {
                fee1: row.get(4)?,
                fee2: row.get(5)?,
            },
        },
        making_charges: MakingCharges {
            less_than_2g: MakingRate {
                rate_per_gram: row.get(6)?,
            },
            greater_than_2g: MakingRate {
                rate_per_gram: row.get(7)?,
            },
            multiplier: row.get(8)?,
        },
        gst_rate: row.get(9)?,
        last_updated,
        updated_by: row.get(11)?,
    })
}

/// Get the stored schedule, if one has been written
pub fn get_pricing_config(conn: &Connection) -> Result<Option<PricingConfig>> {
    let config = conn.query_row(SELECT_CONFIG, [], from_row).optional()?;
    Ok(config)
}

fn write(conn: &Connection, verb: &str, config: &PricingConfig) -> Result<usize> {
    let d = &config.diamond_margins;
    let m = &config.making_charges;
    let sql = format!(
        "{} INTO pricing_config (
            id, lt1ct_multiplier, lt1ct_flat_addition, gt1ct_multiplier, gt1ct_flat_addition,
            base_fee1, base_fee2, making_lt2g_rate, making_gt2g_rate, making_multiplier,
            gst_rate, last_updated, updated_by
         ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        verb
    );

    let changed = conn.execute(
        &sql,
        params![
            d.less_than_1ct.multiplier,
            d.less_than_1ct.flat_addition,
            d.greater_than_1ct.multiplier,
            d.greater_than_1ct.flat_addition,
            d.base_fees.fee1,
            d.base_fees.fee2,
            m.less_than_2g.rate_per_gram,
            m.greater_than_2g.rate_per_gram,
            m.multiplier,
            config.gst_rate,
            config.last_updated.to_rfc3339(),
            config.updated_by,
        ],
    )?;
    Ok(changed)
}

/// Replace the stored schedule
pub fn save_pricing_config(conn: &Connection, config: &PricingConfig) -> Result<PricingConfig> {
    write(conn, "INSERT OR REPLACE", config)?;
    Ok(get_pricing_config(conn)?.unwrap_or_else(|| config.clone()))
}

/// Store `default` only if no schedule exists yet; returns whichever row is live.
pub fn init_pricing_config(conn: &Connection, default: &PricingConfig) -> Result<PricingConfig> {
    if write(conn, "INSERT OR IGNORE", default)? > 0 {
        tracing::info!(updated_by = %default.updated_by, "Initialized pricing config");
    }
    Ok(get_pricing_config(conn)?.unwrap_or_else(|| default.clone()))
}
