use clap::Parser;
use rental_core::adapters::catalog_file::write_units_csv;
use rental_core::adapters::{
    in_memory_service, CatalogData, InMemoryService, StaticIdentity, SystemClock,
};
use rental_core::config::{Command, OutputFormat};
use rental_core::core::booking::redirect_for;
use rental_core::core::dashboard::BookingCounts;
use rental_core::core::reviews::{parse_rating_filter, ReviewSubmission};
use rental_core::domain::model::{Actor, Capability, LeaseDuration, PriceBreakdown, Unit};
use rental_core::domain::ports::{ConfigProvider, IdentityProvider};
use rental_core::utils::error::ErrorSeverity;
use rental_core::utils::{logger, validation::Validate};
use rental_core::{CliConfig, Result, SearchCriteria, TomlConfig};
use serde::Serialize;
use std::path::Path;

fn main() {
    let cli = CliConfig::parse();

    // 載入配置，檔案不存在時使用預設值
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    let level = config.logging.level.as_deref();
    if config.json_logs() {
        logger::init_json_logger(cli.verbose, level);
    } else {
        logger::init_cli_logger(cli.verbose, level);
    }

    tracing::info!("Starting rental CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&cli, &config) {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        if let Some(redirect) = redirect_for(&e) {
            tracing::debug!("Redirect target: {:?}", redirect);
        }

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 1,      // 使用者可修正的輸入
            ErrorSeverity::Medium => 2,   // 狀態或權限不符
            ErrorSeverity::High => 1,     // 資料或設定錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        };
        std::process::exit(exit_code);
    }
}

fn load_config(path: &str) -> Result<TomlConfig> {
    if Path::new(path).exists() {
        TomlConfig::from_file(path)
    } else {
        Ok(TomlConfig::default())
    }
}

fn run(cli: &CliConfig, config: &TomlConfig) -> Result<()> {
    let catalog_file = cli.catalog.as_deref().or(config.catalog_file());
    let data = CatalogData::load_or_sample(catalog_file)?;
    let service = in_memory_service(data, config, Box::new(SystemClock))?;

    let identity = match config.actor()? {
        Some(actor) => StaticIdentity::signed_in(actor),
        None => StaticIdentity::anonymous(),
    };
    let actor = identity.current_actor();
    if let Some(actor) = &actor {
        tracing::debug!("Acting as {} ({})", actor.name, actor.capability);
    }

    dispatch(&service, actor.as_ref(), cli)
}

fn dispatch(service: &InMemoryService, actor: Option<&Actor>, cli: &CliConfig) -> Result<()> {
    let format = cli.format;
    match &cli.command {
        Command::Search {
            query,
            unit_type,
            price,
            bedrooms,
        } => {
            let mut criteria = SearchCriteria::from_form(query, unit_type, price)?;
            criteria.bedrooms = *bedrooms;
            let units = service.search(&criteria)?;
            print_units(&units, format)
        }
        Command::Show { unit } => {
            let detail = service.unit_detail(*unit)?;
            match format {
                OutputFormat::Json => print_json(&detail),
                OutputFormat::Csv => print_units(std::slice::from_ref(&detail.unit), format),
                OutputFormat::Table => {
                    print_units(std::slice::from_ref(&detail.unit), format)?;
                    println!(
                        "⭐ {:.2} from {} reviews",
                        detail.rating.rounded_average(),
                        detail.rating.total
                    );
                    Ok(())
                }
            }
        }
        Command::Quote { unit, months } => {
            let duration = LeaseDuration::try_from(*months)?;
            let quote = service.quote(*unit, duration)?;
            match format {
                OutputFormat::Json => print_json(&quote),
                _ => {
                    print_breakdown(&quote, duration);
                    Ok(())
                }
            }
        }
        Command::Book {
            unit,
            start,
            months,
            payment,
            yes,
        } => {
            let mut checkout = service.begin_checkout(actor, Some(*unit))?;
            checkout.set_start_date_str(start)?;
            checkout.set_duration_months(*months)?;
            checkout.set_payment_method(payment.parse()?)?;

            let snapshot = service.submit_checkout(&mut checkout)?;
            if !yes {
                return match format {
                    OutputFormat::Json => print_json(&snapshot),
                    _ => {
                        println!(
                            "📋 {} from {} to {} ({:?})",
                            checkout.unit().name,
                            snapshot.start_date,
                            snapshot.end_date,
                            snapshot.draft.payment_method
                        );
                        print_breakdown(&snapshot.price, snapshot.draft.duration);
                        println!("Run again with --yes to confirm.");
                        Ok(())
                    }
                };
            }

            let booking = service.confirm_checkout(&mut checkout)?;
            match format {
                OutputFormat::Json => print_json(&booking),
                _ => {
                    println!(
                        "✅ Booking {} ({}) total {}",
                        booking.code,
                        booking.status,
                        booking.total()
                    );
                    Ok(())
                }
            }
        }
        Command::Reviews { unit, rating, sort } => {
            let page = service.review_page(*unit, parse_rating_filter(rating)?, sort.parse()?)?;
            match format {
                OutputFormat::Json => print_json(&page),
                _ => {
                    println!(
                        "⭐ {:.2} average from {} reviews",
                        page.stats.rounded_average(),
                        page.stats.total
                    );
                    for (stars, count) in page.stats.distribution.iter().rev() {
                        println!(
                            "  {} ★ {:>3} ({:.0}%)",
                            stars,
                            count,
                            page.stats.share(*stars)
                        );
                    }
                    for review in &page.reviews {
                        println!(
                            "#{} {} ★{} {} [{} helpful]\n    {}",
                            review.id,
                            review.author_name,
                            review.rating,
                            review.created_on,
                            review.helpful,
                            review.body
                        );
                    }
                    Ok(())
                }
            }
        }
        Command::Review {
            unit,
            rating,
            body,
            photos,
        } => {
            let review = service.submit_review(
                actor,
                ReviewSubmission {
                    unit_id: *unit,
                    rating: *rating,
                    body: body.clone(),
                    photos: photos.clone(),
                },
            )?;
            match format {
                OutputFormat::Json => print_json(&review),
                _ => {
                    println!("📝 Review #{} saved", review.id);
                    Ok(())
                }
            }
        }
        Command::Vote { unit, review } => {
            let helpful = service.vote_helpful(actor, *unit, *review)?;
            println!("👍 Review #{} now has {} helpful votes", review, helpful);
            Ok(())
        }
        Command::Favorite { unit } => {
            let saved = service.toggle_favorite(actor, *unit)?;
            if saved {
                println!("❤️ Unit {} saved to favorites", unit);
            } else {
                println!("Unit {} removed from favorites", unit);
            }
            Ok(())
        }
        Command::Favorites { query } => {
            let criteria = SearchCriteria::default().with_query(query.as_str());
            let units = service.favorites(actor, &criteria)?;
            print_units(&units, format)
        }
        Command::Dashboard => match actor.map(|a| a.capability) {
            Some(Capability::Manager) => {
                let stats = service.manager_dashboard(actor)?;
                if format == OutputFormat::Json {
                    return print_json(&stats);
                }
                println!(
                    "🏢 Units: {} total, {} rented ({:.2}% occupancy)",
                    stats.units.total, stats.units.rented, stats.units.rate
                );
                print_counts(&stats.bookings);
                println!("💰 Revenue: {} ({} this month)", stats.revenue, stats.monthly_revenue);
                Ok(())
            }
            _ => {
                let stats = service.tenant_dashboard(actor)?;
                if format == OutputFormat::Json {
                    return print_json(&stats);
                }
                print_counts(&stats.bookings);
                println!("💰 Spent: {}", stats.total_spent);
                println!("❤️ Favorites: {}", stats.favorites);
                Ok(())
            }
        },
    }
}

fn print_counts(counts: &BookingCounts) {
    println!(
        "📋 Bookings: {} total, {} pending, {} active, {} completed, {} cancelled, {} rejected",
        counts.total,
        counts.pending,
        counts.active,
        counts.completed,
        counts.cancelled,
        counts.rejected
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_units(units: &[Unit], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&units),
        OutputFormat::Csv => write_units_csv(units, std::io::stdout()),
        OutputFormat::Table => {
            if units.is_empty() {
                println!("🔍 No units match");
                return Ok(());
            }
            println!(
                "{:>4}  {:<16} {:<12} {:>12} {:>7} {:>4}  {}",
                "ID", "NAME", "TYPE", "PRICE", "SIZE", "FLR", "STATUS"
            );
            for unit in units {
                println!(
                    "{:>4}  {:<16} {:<12} {:>12} {:>6.1}m² {:>4}  {:?}",
                    unit.id,
                    unit.name,
                    unit.unit_type.label(),
                    unit.monthly_price,
                    unit.size_sqm,
                    unit.floor,
                    unit.availability
                );
            }
            Ok(())
        }
    }
}

fn print_breakdown(price: &PriceBreakdown, duration: LeaseDuration) {
    println!("  Rent ({} months) {:>14}", duration.months(), price.rent);
    println!("  Deposit          {:>14}", price.deposit);
    println!("  Admin fee        {:>14}", price.admin_fee);
    println!("  Total            {:>14}", price.total);
}
