//! Prompt builders for the analytics endpoints
//!
//! Each prompt embeds a plain-text data summary of the store and the reply
//! format understood by [`super::parse`].

use std::fmt::Write;

use shared::models::{Customer, DailySales, DashboardStats, ProductSummary, RawMaterialSummary, TopProduct};

use crate::db::dashboard::CustomerOverview;
use crate::util::format_rupiah;

const ROLE: &str = "Anda adalah konsultan bisnis ritel untuk UMKM di Indonesia. \
Analisis data toko berikut dan berikan wawasan yang konkret dan dapat ditindaklanjuti. \
Semua nilai uang dalam Rupiah.";

const REPLY_FORMAT: &str = "\
Berikan 3 sampai 5 wawasan. Tulis setiap wawasan persis dalam format berikut, \
dipisahkan satu baris kosong, tanpa teks lain:

TYPE: opportunity | warning | trend | recommendation
TITLE: judul singkat
DESCRIPTION: penjelasan 1-3 kalimat dengan angka dari data
IMPACT: high | medium | low
CONFIDENCE: angka 0-100";

fn finish(mut prompt: String) -> String {
    prompt.push('\n');
    prompt.push_str(REPLY_FORMAT);
    prompt
}

fn write_daily_sales(out: &mut String, days: &[DailySales]) {
    let _ = writeln!(out, "Penjualan harian:");
    if days.is_empty() {
        let _ = writeln!(out, "- belum ada data");
    }
    for day in days {
        let _ = writeln!(
            out,
            "- {}: {} dari {} pesanan",
            day.date,
            format_rupiah(day.revenue),
            day.orders
        );
    }
}

fn write_top_products(out: &mut String, products: &[TopProduct]) {
    let _ = writeln!(out, "Produk terlaris:");
    if products.is_empty() {
        let _ = writeln!(out, "- belum ada penjualan");
    }
    for (rank, p) in products.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {}: {} terjual, {}",
            rank + 1,
            p.name,
            p.quantity_sold,
            format_rupiah(p.revenue)
        );
    }
}

fn write_low_materials(out: &mut String, materials: &[RawMaterialSummary]) {
    let low: Vec<_> = materials.iter().filter(|m| m.low_stock).collect();
    let _ = writeln!(out, "Bahan baku di bawah stok minimum: {}", low.len());
    for m in low {
        let _ = writeln!(
            out,
            "- {}: {} {} (minimum {})",
            m.name, m.stock, m.unit, m.min_stock_level
        );
    }
}

fn write_customer_overview(out: &mut String, c: &CustomerOverview) {
    let _ = writeln!(
        out,
        "Pelanggan: {} total ({} VIP, {} reguler, {} baru), rata-rata belanja {}, \
         {} tidak berkunjung dalam 30 hari",
        c.total,
        c.vip_count,
        c.regular_count,
        c.new_count,
        format_rupiah(c.average_spent),
        c.inactive_30d
    );
}

/// General business overview
pub fn insights_prompt(
    stats: &DashboardStats,
    week: &[DailySales],
    top: &[TopProduct],
    materials: &[RawMaterialSummary],
    customers: &CustomerOverview,
) -> String {
    let mut out = format!("{ROLE}\n\nRingkasan hari ini:\n");
    let _ = writeln!(
        out,
        "- Pendapatan {} dari {} pesanan, rata-rata {} per pesanan",
        format_rupiah(stats.today_revenue),
        stats.today_orders,
        format_rupiah(stats.average_order_value)
    );
    let _ = writeln!(
        out,
        "- {} produk aktif, {} produk dan {} bahan baku stok rendah",
        stats.active_products, stats.low_stock_products, stats.low_stock_materials
    );
    write_daily_sales(&mut out, week);
    write_top_products(&mut out, top);
    write_low_materials(&mut out, materials);
    write_customer_overview(&mut out, customers);
    finish(out)
}

/// Sales performance: trend, best sellers, payment mix
pub fn sales_prompt(
    days: &[DailySales],
    top: &[TopProduct],
    payment_mix: &[(String, i64, f64)],
) -> String {
    let mut out = format!("{ROLE}\nFokus: performa penjualan.\n\n");
    let total: f64 = days.iter().map(|d| d.revenue).sum();
    let orders: i64 = days.iter().map(|d| d.orders).sum();
    let _ = writeln!(
        out,
        "Total {} hari terakhir: {} dari {} pesanan",
        days.len(),
        format_rupiah(total),
        orders
    );
    write_daily_sales(&mut out, days);
    write_top_products(&mut out, top);
    let _ = writeln!(out, "Metode pembayaran:");
    for (method, count, revenue) in payment_mix {
        let _ = writeln!(out, "- {method}: {count} pesanan, {}", format_rupiah(*revenue));
    }
    finish(out)
}

/// Stock health of raw materials and products
pub fn inventory_prompt(
    materials: &[RawMaterialSummary],
    products: &[ProductSummary],
    top: &[TopProduct],
) -> String {
    let mut out = format!("{ROLE}\nFokus: manajemen stok dan bahan baku.\n\n");
    let _ = writeln!(out, "Bahan baku ({}):", materials.len());
    for m in materials {
        let _ = writeln!(
            out,
            "- {}: {} {} (minimum {}, {} per {}){}",
            m.name,
            m.stock,
            m.unit,
            m.min_stock_level,
            format_rupiah(m.cost_per_unit),
            m.unit,
            if m.low_stock { " STOK RENDAH" } else { "" }
        );
    }
    let _ = writeln!(out, "Produk aktif ({}):", products.len());
    for p in products {
        let _ = writeln!(
            out,
            "- {}: stok {} {} (minimum {}), harga {}, {} bahan resep{}",
            p.name,
            p.stock_quantity,
            p.unit,
            p.min_stock_level,
            format_rupiah(p.price),
            p.recipe_count,
            if p.low_stock { " STOK RENDAH" } else { "" }
        );
    }
    write_top_products(&mut out, top);
    finish(out)
}

/// Customer base and loyalty
pub fn customers_prompt(overview: &CustomerOverview, best: &[Customer]) -> String {
    let mut out = format!("{ROLE}\nFokus: pelanggan dan loyalitas.\n\n");
    write_customer_overview(&mut out, overview);
    let _ = writeln!(out, "Pelanggan dengan belanja tertinggi:");
    for c in best {
        let _ = writeln!(
            out,
            "- {} ({:?}): {} dalam {} transaksi",
            c.name,
            c.segment,
            format_rupiah(c.total_spent),
            c.total_transactions
        );
    }
    finish(out)
}
