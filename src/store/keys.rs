//! The closed key catalogue for the assumption store.
//!
//! Every key the pipeline reads is declared here; a lookup of anything
//! else is a `MissingAssumption` error, not a default.

// Tier pricing (retail to consumer)
pub const PRICE_SHORT: &str = "price_short";
pub const COGS_SHORT: &str = "cogs_short";
pub const PRICE_MEDIUM: &str = "price_medium";
pub const COGS_MEDIUM: &str = "cogs_medium";
pub const PRICE_PERPETUAL: &str = "price_perpetual";
pub const COGS_PERPETUAL: &str = "cogs_perpetual";

// Tier lifetimes (amortization horizon for recognition + lifetime cost)
pub const LIFETIME_SHORT_MONTHS: &str = "lifetime_short_months";
pub const LIFETIME_MEDIUM_MONTHS: &str = "lifetime_medium_months";
pub const LIFETIME_PERPETUAL_MONTHS: &str = "lifetime_perpetual_months";

// Add-on pricing
pub const EXTEND_PRICE: &str = "extend_price";
pub const EXTEND_COST: &str = "extend_cost";
pub const UPGRADE_PRICE: &str = "upgrade_price";
pub const UPGRADE_COST: &str = "upgrade_cost";
pub const GIFT_WRAP_PRICE: &str = "gift_wrap_price";
pub const GIFT_WRAP_COST: &str = "gift_wrap_cost";

// Monthly unit sales (starting month 1) and MoM growth
pub const START_UNITS_SHORT: &str = "start_units_short";
pub const GROWTH_SHORT: &str = "growth_short";
pub const START_UNITS_MEDIUM: &str = "start_units_medium";
pub const GROWTH_MEDIUM: &str = "growth_medium";
pub const START_UNITS_PERPETUAL: &str = "start_units_perpetual";
pub const GROWTH_PERPETUAL: &str = "growth_perpetual";

// Add-on attach rates
pub const EXTEND_ATTACH_RATE: &str = "extend_attach_rate"; // % of cumulative base
pub const UPGRADE_ATTACH_RATE: &str = "upgrade_attach_rate"; // % of cumulative base
pub const GIFT_WRAP_ATTACH_RATE: &str = "gift_wrap_attach_rate"; // % of new monthly sales

// Content size profile (mix must sum to 100%)
pub const VIDEO_SIZE_MB: &str = "video_size_mb";
pub const VIDEO_MIX: &str = "video_mix";
pub const IMAGE_SIZE_MB: &str = "image_size_mb";
pub const IMAGE_MIX: &str = "image_mix";
pub const AUDIO_SIZE_MB: &str = "audio_size_mb";
pub const AUDIO_MIX: &str = "audio_mix";
pub const CLAIM_RATE: &str = "claim_rate"; // unclaimed units store nothing
pub const REUPLOAD_RATE: &str = "reupload_rate"; // re-upload during settling window

// Playback & request volume
pub const VIEWS_NOVELTY: &str = "views_novelty"; // per unit per month, first 3 months
pub const VIEWS_LONG_TAIL: &str = "views_long_tail"; // per unit per month, afterwards
pub const GLYPH_VERIFY_RATE: &str = "glyph_verify_rate"; // % of views needing verification
pub const LIFECYCLE_API_CALLS: &str = "lifecycle_api_calls"; // one-time per claimed unit
pub const TABLE_SETUP_WRITES: &str = "table_setup_writes"; // one-time per claimed unit
pub const TABLE_READS_PER_VIEW: &str = "table_reads_per_view";

// Cold storage (backup mirror, cool tier)
pub const COLD_STORAGE_RATE_GB: &str = "cold_storage_rate_gb";
pub const COLD_WRITE_RATE_10K: &str = "cold_write_rate_10k";
pub const COLD_READ_RATE_10K: &str = "cold_read_rate_10k";
pub const COLD_RETRIEVAL_RATE_GB: &str = "cold_retrieval_rate_gb";
pub const COLD_EGRESS_RATE_GB: &str = "cold_egress_rate_gb";

// CDN storage (primary delivery, zero egress)
pub const CDN_STORAGE_RATE_GB: &str = "cdn_storage_rate_gb";
pub const CDN_CLASS_A_RATE_1M: &str = "cdn_class_a_rate_1m"; // writes
pub const CDN_CLASS_B_RATE_1M: &str = "cdn_class_b_rate_1m"; // reads
pub const CDN_EGRESS_RATE_GB: &str = "cdn_egress_rate_gb";
pub const CDN_FREE_STORAGE_GB: &str = "cdn_free_storage_gb";
pub const CDN_FREE_CLASS_A: &str = "cdn_free_class_a";
pub const CDN_FREE_CLASS_B: &str = "cdn_free_class_b";

// Table storage (metadata & telemetry)
pub const TABLE_STORAGE_RATE_GB: &str = "table_storage_rate_gb";
pub const TABLE_TXN_RATE_10K: &str = "table_txn_rate_10k";
pub const TABLE_ENTITY_KB: &str = "table_entity_kb";

// Compute (consumption plan)
pub const COMPUTE_EXEC_RATE_1M: &str = "compute_exec_rate_1m";
pub const COMPUTE_GBS_RATE: &str = "compute_gbs_rate";
pub const COMPUTE_DURATION_MS: &str = "compute_duration_ms";
pub const COMPUTE_MEMORY_MB: &str = "compute_memory_mb";
pub const COMPUTE_FREE_EXECUTIONS: &str = "compute_free_executions";
pub const COMPUTE_FREE_GB_SECONDS: &str = "compute_free_gb_seconds";

// Identity & fixed platform
pub const IDENTITY_BASE_COST: &str = "identity_base_cost";
pub const IDENTITY_MAU_RATE: &str = "identity_mau_rate"; // per MAU above the free tier
pub const IDENTITY_FREE_MAU: &str = "identity_free_mau";
pub const MAU_PER_ACTIVE_UNIT: &str = "mau_per_active_unit";
pub const DOMAIN_MONTHLY_COST: &str = "domain_monthly_cost";
pub const MONITORING_MONTHLY_COST: &str = "monitoring_monthly_cost";

// Operating expenses
pub const MARKETING_START: &str = "marketing_start";
pub const MARKETING_GROWTH: &str = "marketing_growth";
pub const SHIPPING_COST_PER_UNIT: &str = "shipping_cost_per_unit";
pub const PAYMENT_PROCESSING_RATE: &str = "payment_processing_rate";
pub const SUPPORT_START: &str = "support_start";
pub const SUPPORT_GROWTH: &str = "support_growth";
pub const INSURANCE_START: &str = "insurance_start";
pub const INSURANCE_GROWTH: &str = "insurance_growth";

pub const TAX_RATE: &str = "tax_rate"; // on positive EBITDA only

// Returns & replacements
pub const RETURN_RATE: &str = "return_rate";
pub const PRE_CLAIM_SHARE: &str = "pre_claim_share"; // restockable share of returns
pub const SALVAGE_RATE: &str = "salvage_rate"; // COGS recovered on pre-claim restocks
pub const RETURN_SHIPPING_COST: &str = "return_shipping_cost";
pub const RETURN_PROCESSING_COST: &str = "return_processing_cost";
pub const DEFECT_RATE: &str = "defect_rate"; // free replacements
pub const REPLACEMENT_SHIPPING_COST: &str = "replacement_shipping_cost";
pub const REPLACEMENT_COGS_SHARE: &str = "replacement_cogs_share";

// Operational constants
pub const ADMIN_CALL_OVERHEAD: &str = "admin_call_overhead"; // extra invocations, % of views
pub const FALLBACK_READ_SHARE: &str = "fallback_read_share"; // % of views hitting cold storage
pub const CDN_WRITES_PER_CLAIM: &str = "cdn_writes_per_claim";
pub const TABLE_WRITES_PER_GLYPH: &str = "table_writes_per_glyph";
pub const REQUEST_LOG_SAMPLING: &str = "request_log_sampling";
pub const NOVELTY_WINDOW_MONTHS: &str = "novelty_window_months";
