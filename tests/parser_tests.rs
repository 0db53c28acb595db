use lab_nmap_rs::parser::parse_output;
use lab_nmap_rs::types::Protocol;

const SCANME: &str = r#"Starting Nmap 7.94 ( https://nmap.org ) at 2024-05-01 12:00 UTC
Nmap scan report for scanme.nmap.org (45.33.32.156)
Host is up (0.080s latency).
Not shown: 16 closed tcp ports (conn-refused)
PORT      STATE    SERVICE    VERSION
22/tcp    open     ssh        OpenSSH 6.6.1p1 Ubuntu 2ubuntu2.13 (Ubuntu Linux; protocol 2.0)
80/tcp    open     http       Apache httpd 2.4.7 ((Ubuntu))
135/tcp   filtered msrpc
9929/tcp  open     nping-echo Nping echo
Aggressive OS guesses: Linux 2.6.32 (96%), Linux 3.2 - 4.9 (95%)
Service Info: OS: Linux; CPE: cpe:/o:linux:linux_kernel

OS and Service detection performed. Please report any incorrect results at https://nmap.org/submit/ .
Nmap done: 1 IP address (1 host up) scanned in 12.34 seconds
"#;

#[test]
fn scanme_output_fields() {
    let res = parse_output(SCANME, "scanme.nmap.org");
    assert_eq!(res.host, "scanme.nmap.org");
    assert_eq!(res.raw_output, SCANME);

    let ports: Vec<(&str, &str, &str)> = res
        .ports
        .iter()
        .map(|p| (p.port.as_str(), p.state.as_str(), p.name.as_str()))
        .collect();
    assert_eq!(
        ports,
        vec![
            ("22", "open", "ssh"),
            ("80", "open", "http"),
            ("135", "filtered", "msrpc"),
            ("9929", "open", "nping-echo"),
        ]
    );
    assert!(res.ports.iter().all(|p| p.protocol == Protocol::Tcp));
    assert_eq!(res.ports[1].service, "Apache httpd 2.4.7 ((Ubuntu))");
    assert_eq!(res.ports[2].service, "msrpc");
    assert_eq!(res.open_ports().count(), 3);

    assert_eq!(
        res.os_info.as_deref(),
        Some("Linux 2.6.32 (96%), Linux 3.2 - 4.9 (95%)")
    );
    assert_eq!(res.scan_info.as_deref(), Some("12.34 seconds"));
}

#[test]
fn apache_port_line() {
    let res = parse_output("80/tcp   open  http  Apache 2.4\n", "h");
    let p = &res.ports[0];
    assert_eq!(p.port, "80");
    assert_eq!(p.protocol.as_str(), "tcp");
    assert_eq!(p.state, "open");
    assert_eq!(p.service, "Apache 2.4");
}

#[test]
fn os_details_line() {
    let res = parse_output("OS details: Linux 3.2 - 4.9\n", "h");
    assert_eq!(res.os_info.as_deref(), Some("Linux 3.2 - 4.9"));
}

#[test]
fn aggressive_guess_only() {
    let res = parse_output("Aggressive OS guesses: Linux 2.6.32\n", "h");
    assert_eq!(res.os_info.as_deref(), Some("Linux 2.6.32"));
}

#[test]
fn nmap_done_timing() {
    let res = parse_output(
        "Nmap done: 1 IP address (1 host up) scanned in 12.34 seconds\n",
        "h",
    );
    assert_eq!(res.scan_info.as_deref(), Some("12.34 seconds"));
}

#[test]
fn parsing_is_idempotent() {
    let a = parse_output(SCANME, "scanme.nmap.org");
    let b = parse_output(SCANME, "scanme.nmap.org");
    assert_eq!(a, b);
}

#[test]
fn duplicates_kept_in_order() {
    let text = "443/tcp open https\n53/udp open domain\n443/tcp open https\n";
    let res = parse_output(text, "h");
    let ports: Vec<_> = res.ports.iter().map(|p| (p.port.as_str(), p.protocol)).collect();
    assert_eq!(
        ports,
        vec![("443", Protocol::Tcp), ("53", Protocol::Udp), ("443", Protocol::Tcp)]
    );
}

#[test]
fn garbage_yields_empty_fields() {
    let res = parse_output("nmap: unrecognized option '--bogus'\nQUITTING!\n", "h");
    assert!(res.ports.is_empty());
    assert_eq!(res.os_info, None);
    assert_eq!(res.scan_info, None);
    assert!(parse_output("", "h").ports.is_empty());
}
