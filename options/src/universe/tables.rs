//! The standard option spaces: code, name, format.

pub(super) const DHCP_OPTIONS: &[(u32, &str, &str)] = &[
    (0, "pad", ""),
    (1, "subnet-mask", "I"),
    (2, "time-offset", "l"),
    (3, "routers", "IA"),
    (4, "time-servers", "IA"),
    (5, "ien116-name-servers", "IA"),
    (6, "domain-name-servers", "IA"),
    (7, "log-servers", "IA"),
    (8, "cookie-servers", "IA"),
    (9, "lpr-servers", "IA"),
    (10, "impress-servers", "IA"),
    (11, "resource-location-servers", "IA"),
    (12, "host-name", "t"),
    (13, "boot-size", "S"),
    (14, "merit-dump", "t"),
    (15, "domain-name", "t"),
    (16, "swap-server", "I"),
    (17, "root-path", "t"),
    (18, "extensions-path", "t"),
    (19, "ip-forwarding", "f"),
    (20, "non-local-source-routing", "f"),
    (21, "policy-filter", "IIA"),
    (22, "max-dgram-reassembly", "S"),
    (23, "default-ip-ttl", "B"),
    (24, "path-mtu-aging-timeout", "L"),
    (25, "path-mtu-plateau-table", "SA"),
    (26, "interface-mtu", "S"),
    (27, "all-subnets-local", "f"),
    (28, "broadcast-address", "I"),
    (29, "perform-mask-discovery", "f"),
    (30, "mask-supplier", "f"),
    (31, "router-discovery", "f"),
    (32, "router-solicitation-address", "I"),
    (33, "static-routes", "IIA"),
    (34, "trailer-encapsulation", "f"),
    (35, "arp-cache-timeout", "L"),
    (36, "ieee802-3-encapsulation", "f"),
    (37, "default-tcp-ttl", "B"),
    (38, "tcp-keepalive-interval", "L"),
    (39, "tcp-keepalive-garbage", "f"),
    (40, "nis-domain", "t"),
    (41, "nis-servers", "IA"),
    (42, "ntp-servers", "IA"),
    (43, "vendor-encapsulated-options", "E."),
    (44, "netbios-name-servers", "IA"),
    (45, "netbios-dd-server", "IA"),
    (46, "netbios-node-type", "B"),
    (47, "netbios-scope", "t"),
    (48, "font-servers", "IA"),
    (49, "x-display-manager", "IA"),
    (50, "dhcp-requested-address", "I"),
    (51, "dhcp-lease-time", "L"),
    (52, "dhcp-option-overload", "B"),
    (53, "dhcp-message-type", "B"),
    (54, "dhcp-server-identifier", "I"),
    (55, "dhcp-parameter-request-list", "BA"),
    (56, "dhcp-message", "t"),
    (57, "dhcp-max-message-size", "S"),
    (58, "dhcp-renewal-time", "L"),
    (59, "dhcp-rebinding-time", "L"),
    (60, "vendor-class-identifier", "X"),
    (61, "dhcp-client-identifier", "X"),
    (62, "nwip-domain", "t"),
    (63, "nwip-suboptions", "Enwip."),
    (64, "nisplus-domain", "t"),
    (65, "nisplus-servers", "IA"),
    (66, "tftp-server-name", "t"),
    (67, "bootfile-name", "t"),
    (68, "mobile-ip-home-agent", "IA"),
    (69, "smtp-server", "IA"),
    (70, "pop-server", "IA"),
    (71, "nntp-server", "IA"),
    (72, "www-server", "IA"),
    (73, "finger-server", "IA"),
    (74, "irc-server", "IA"),
    (75, "streettalk-server", "IA"),
    (76, "streettalk-directory-assistance-server", "IA"),
    (77, "user-class", "t"),
    (78, "slp-directory-agent", "fIa"),
    (79, "slp-service-scope", "fto"),
    (81, "fqdn", "Efqdn."),
    (82, "relay-agent-information", "Eagent."),
    (85, "nds-servers", "IA"),
    (86, "nds-tree-name", "X"),
    (87, "nds-context", "X"),
    (118, "subnet-selection", "I"),
    (121, "classless-static-routes", "X"),
    (255, "end", ""),
];

pub(super) const AGENT_OPTIONS: &[(u32, &str, &str)] = &[
    (1, "circuit-id", "X"),
    (2, "remote-id", "X"),
    (3, "agent-id", "I"),
];

pub(super) const FQDN_OPTIONS: &[(u32, &str, &str)] = &[
    (1, "no-client-update", "f"),
    (2, "server-update", "f"),
    (3, "encoded", "f"),
    (4, "rcode1", "B"),
    (5, "rcode2", "B"),
    (6, "hostname", "t"),
    (7, "domainname", "t"),
    (8, "fqdn", "t"),
];

pub(super) const NWIP_OPTIONS: &[(u32, &str, &str)] = &[
    (1, "illegal-1", ""),
    (2, "illegal-2", ""),
    (3, "illegal-3", ""),
    (4, "illegal-4", ""),
    (5, "nsq-broadcast", "f"),
    (6, "preferred-dss", "IA"),
    (7, "nearest-nwip-server", "IA"),
    (8, "autoretries", "B"),
    (9, "autoretry-secs", "B"),
    (10, "nwip-1-1", "f"),
    (11, "primary-dss", "I"),
];
