use livecount::fingerprint::SYNTHETIC_COOKIES;

pub fn cmd_fingerprint(count: usize) {
    println!("🎭 Generating {count} browser profiles:\n");

    for i in 0..count {
        let profile = livecount::random_profile();
        println!("Profile {}:", i + 1);
        println!("   UA: {}", profile.user_agent);
        if let Some(sec_ch_ua) = profile.sec_ch_ua {
            println!("   Sec-CH-UA: {sec_ch_ua}");
        }
        if let Some(platform) = profile.sec_ch_ua_platform {
            println!("   Sec-CH-UA-Platform: {platform}");
        }
        println!();
    }

    println!("🍪 Cookie: {SYNTHETIC_COOKIES}");
}
