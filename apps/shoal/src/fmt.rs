//! Display helpers shared by the list, details, and watch commands.

use shoal_rpc::model::TrackerStat;

/// Decimal-formatted size with binary thresholds.
pub fn format_bytes(n: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    if n >= GB {
        format!("{:.3} GB", n / GB)
    } else if n >= MB {
        format!("{:.3} MB", n / MB)
    } else if n >= KB {
        format!("{:.3} kB", n / KB)
    } else {
        format!("{:.0} bytes", n)
    }
}

pub fn format_rate(n: f64) -> String {
    format!("{}/s", format_bytes(n))
}

/// Spell a duration out in words, largest unit first.
pub fn format_duration(seconds: i64) -> String {
    let mut seconds = seconds.max(0);
    let mut out = Vec::new();
    let units: &[(i64, &str, &str)] = &[
        (24 * 60 * 60, "day", "days"),
        (60 * 60, "hour", "hours"),
        (60, "minute", "minutes"),
    ];
    for (unit, singular, plural) in units {
        if seconds > *unit {
            let count = seconds / unit;
            seconds -= count * unit;
            let word = if count == 1 { singular } else { plural };
            out.push(format!("{count} {word}"));
        }
    }
    if seconds > 0 {
        let word = if seconds == 1 { "second" } else { "seconds" };
        out.push(format!("{seconds} {word}"));
    }
    if out.is_empty() {
        "0 seconds".to_string()
    } else {
        out.join(" ")
    }
}

/// Best seeder count across a torrent's trackers, never negative.
pub fn count_seeds(stats: &[TrackerStat]) -> i64 {
    stats.iter().map(|stat| stat.seeder_count).fold(0, i64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_pick_the_largest_fitting_unit() {
        assert_eq!(format_bytes(500.0), "500 bytes");
        assert_eq!(format_bytes(1024.0), "1.000 kB");
        assert_eq!(format_bytes(1536.0), "1.500 kB");
        assert_eq!(format_bytes(5.5 * 1024.0 * 1024.0), "5.500 MB");
        assert_eq!(format_bytes(3.0 * 1024.0 * 1024.0 * 1024.0), "3.000 GB");
    }

    #[test]
    fn rates_append_per_second() {
        assert_eq!(format_rate(2048.0), "2.000 kB/s");
    }

    #[test]
    fn durations_spell_units_in_words() {
        assert_eq!(format_duration(0), "0 seconds");
        assert_eq!(format_duration(1), "1 second");
        assert_eq!(format_duration(61), "1 minute 1 second");
        assert_eq!(format_duration(90_061), "1 day 1 hour 1 minute 1 second");
    }

    #[test]
    fn negative_durations_clamp_to_zero() {
        assert_eq!(format_duration(-5), "0 seconds");
    }

    #[test]
    fn seed_count_is_the_best_tracker_and_never_negative() {
        let mut stats = vec![TrackerStat::default(), TrackerStat::default()];
        stats[0].seeder_count = -1;
        stats[1].seeder_count = 12;
        assert_eq!(count_seeds(&stats), 12);

        stats[1].seeder_count = -1;
        assert_eq!(count_seeds(&stats), 0);
        assert_eq!(count_seeds(&[]), 0);
    }
}
