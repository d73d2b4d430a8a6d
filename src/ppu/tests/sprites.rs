//! Sprite pipeline tests - evaluation, overflow, rendering, sprite zero

use super::*;

/// PPU with solid CHR and every OAM sprite parked off-screen
fn ppu_for_sprites() -> Ppu {
    let mut ppu = ppu_with_chr(solid_chr(), Mirroring::Horizontal);
    for i in 0..64 {
        ppu.write_oam(i * 4, 0xF0);
    }
    ppu
}

/// Write one OAM entry
fn set_sprite(ppu: &mut Ppu, index: u8, y: u8, tile: u8, attr: u8, x: u8) {
    ppu.write_oam(index * 4, y);
    ppu.write_oam(index * 4 + 1, tile);
    ppu.write_oam(index * 4 + 2, attr);
    ppu.write_oam(index * 4 + 3, x);
}

fn run_one_frame(ppu: &mut Ppu) {
    while !ppu.step() {}
}

// ========================================
// Evaluation Tests
// ========================================

#[test]
fn test_evaluation_copies_in_range_sprites_to_secondary_oam() {
    let mut ppu = ppu_for_sprites();
    set_sprite(&mut ppu, 0, 10, 0x42, 0x01, 0x55);
    set_sprite(&mut ppu, 5, 10, 0x43, 0x02, 0x66);
    ppu.write(PPUMASK, MASK_SHOW_SPRITES);

    // Sprites with Y byte 10 cover scanlines 11-18; line 10 evaluates
    // for line 11
    advance_to_dot(&mut ppu, 10, 257);

    assert_eq!(ppu.eval_found, 2);
    assert_eq!(ppu.secondary_oam[0..4], [10, 0x42, 0x01, 0x55]);
    assert_eq!(ppu.secondary_oam[4..8], [10, 0x43, 0x02, 0x66]);
    // Untouched slots keep the $FF fill
    assert_eq!(ppu.secondary_oam[8], 0xFF);
    assert_eq!(ppu.sprite_count, 2);
    assert_eq!(ppu.sprite_x[0], 0x55);
    assert_eq!(ppu.sprite_x[1], 0x66);
}

#[test]
fn test_evaluation_caps_at_eight_sprites_and_sets_overflow() {
    let mut ppu = ppu_for_sprites();
    for i in 0..9 {
        set_sprite(&mut ppu, i, 10, i, 0, i * 8);
    }
    ppu.write(PPUMASK, MASK_SHOW_SPRITES);

    advance_to_dot(&mut ppu, 10, 257);

    assert_eq!(ppu.eval_found, 8);
    assert_eq!(ppu.sprite_count, 8);
    for slot in 0..8usize {
        assert_eq!(ppu.secondary_oam[slot * 4 + 1], slot as u8);
    }
    // The 9th in-range sprite only sets the overflow flag
    assert_ne!(ppu.ppustatus & STATUS_SPRITE_OVERFLOW, 0);
}

#[test]
fn test_no_overflow_with_exactly_eight_sprites() {
    let mut ppu = ppu_for_sprites();
    for i in 0..8 {
        set_sprite(&mut ppu, i, 10, i, 0, i * 8);
    }
    ppu.write(PPUMASK, MASK_SHOW_SPRITES);

    advance_to_dot(&mut ppu, 10, 257);

    assert_eq!(ppu.eval_found, 8);
    assert_eq!(ppu.ppustatus & STATUS_SPRITE_OVERFLOW, 0);
}

#[test]
fn test_overflow_scan_bug_misreads_tile_byte_as_y() {
    let mut ppu = ppu_for_sprites();
    for i in 0..8 {
        set_sprite(&mut ppu, i, 10, 0, 0, 0);
    }
    // Sprite 8 misses, putting the scanner into its diagonal walk; it then
    // reads sprite 9's tile byte as a Y coordinate
    set_sprite(&mut ppu, 9, 0xF0, 10, 0, 0);
    ppu.write(PPUMASK, MASK_SHOW_SPRITES);

    advance_to_dot(&mut ppu, 10, 257);

    assert_eq!(ppu.eval_found, 8);
    assert_ne!(ppu.ppustatus & STATUS_SPRITE_OVERFLOW, 0);
}

#[test]
fn test_no_evaluation_when_rendering_disabled() {
    let mut ppu = ppu_for_sprites();
    set_sprite(&mut ppu, 0, 10, 0, 0, 0);

    advance_to_dot(&mut ppu, 10, 257);

    assert_eq!(ppu.eval_found, 0);
    assert_eq!(ppu.sprite_count, 0);
    assert_eq!(ppu.secondary_oam[0], 0xFF);
}

// ========================================
// Rendering Tests
// ========================================

#[test]
fn test_sprite_rendered_at_oam_position() {
    let mut ppu = ppu_for_sprites();
    set_sprite(&mut ppu, 0, 49, 1, 0x00, 100);
    ppu.write_ppu_memory(0x3F00, 0x0D);
    ppu.write_ppu_memory(0x3F13, 0x27);
    ppu.write(PPUMASK, MASK_SHOW_SPRITES | MASK_SHOW_SPRITES_LEFT);

    run_one_frame(&mut ppu);

    let frame = ppu.frame();
    // Y byte 49 puts the top row on scanline 50
    assert_eq!(frame.get_pixel(100, 49), 0x0D);
    assert_eq!(frame.get_pixel(99, 50), 0x0D);
    for x in 100..108 {
        assert_eq!(frame.get_pixel(x, 50), 0x27, "pixel ({}, 50)", x);
    }
    assert_eq!(frame.get_pixel(108, 50), 0x0D);
    assert_eq!(frame.get_pixel(100, 57), 0x27);
    assert_eq!(frame.get_pixel(100, 58), 0x0D);
}

#[test]
fn test_lower_oam_index_wins_sprite_overlap() {
    let mut ppu = ppu_for_sprites();
    set_sprite(&mut ppu, 0, 49, 1, 0x01, 100); // palette 5
    set_sprite(&mut ppu, 1, 49, 1, 0x02, 100); // palette 6
    ppu.write_ppu_memory(0x3F17, 0x28);
    ppu.write_ppu_memory(0x3F1B, 0x1A);
    ppu.write(PPUMASK, MASK_SHOW_SPRITES | MASK_SHOW_SPRITES_LEFT);

    run_one_frame(&mut ppu);

    assert_eq!(ppu.frame().get_pixel(100, 50), 0x28);
}

#[test]
fn test_behind_background_priority() {
    let mut ppu = ppu_for_sprites();
    set_sprite(&mut ppu, 0, 49, 1, 0x20, 100);
    ppu.write_ppu_memory(0x3F03, 0x21);
    ppu.write_ppu_memory(0x3F13, 0x27);
    ppu.write(
        PPUMASK,
        MASK_SHOW_BG | MASK_SHOW_SPRITES | MASK_SHOW_BG_LEFT | MASK_SHOW_SPRITES_LEFT,
    );

    run_one_frame(&mut ppu);

    // Opaque background over a behind-priority sprite
    assert_eq!(ppu.frame().get_pixel(100, 50), 0x21);
}

#[test]
fn test_behind_sprite_shows_over_transparent_background() {
    // Pattern table 0 (background) blank, table 1 (sprites) solid
    let mut chr = vec![0u8; 8 * 1024];
    for byte in chr[0x1000..].iter_mut() {
        *byte = 0xFF;
    }
    let mut ppu = ppu_with_chr(chr, Mirroring::Horizontal);
    for i in 0..64 {
        ppu.write_oam(i * 4, 0xF0);
    }
    set_sprite(&mut ppu, 0, 49, 1, 0x20, 100);
    ppu.write(PPUCTRL, CTRL_SPRITE_TABLE);
    ppu.write_ppu_memory(0x3F00, 0x0D);
    ppu.write_ppu_memory(0x3F13, 0x27);
    ppu.write(
        PPUMASK,
        MASK_SHOW_BG | MASK_SHOW_SPRITES | MASK_SHOW_BG_LEFT | MASK_SHOW_SPRITES_LEFT,
    );

    run_one_frame(&mut ppu);

    assert_eq!(ppu.frame().get_pixel(100, 50), 0x27);
}

#[test]
fn test_horizontal_and_vertical_flip() {
    // Tile 2: single opaque pixel in its top-left corner
    let mut chr = vec![0u8; 8 * 1024];
    chr[2 * 16] = 0x80;
    let base = ppu_with_chr(chr, Mirroring::Horizontal);

    let cases = [
        (0x00u8, 100usize, 50usize), // no flip: top-left
        (0x40, 107, 50),             // hflip: top-right
        (0x80, 100, 57),             // vflip: bottom-left
        (0xC0, 107, 57),             // both: bottom-right
    ];

    for (attr, px, py) in cases {
        let mut ppu = Ppu::new();
        ppu.set_mapper(base.mapper.clone().unwrap());
        for i in 0..64 {
            ppu.write_oam(i * 4, 0xF0);
        }
        set_sprite(&mut ppu, 0, 49, 2, attr, 100);
        ppu.write_ppu_memory(0x3F00, 0x0D);
        ppu.write_ppu_memory(0x3F11, 0x2C);
        ppu.write(PPUMASK, MASK_SHOW_SPRITES | MASK_SHOW_SPRITES_LEFT);

        run_one_frame(&mut ppu);

        let frame = ppu.frame();
        assert_eq!(frame.get_pixel(px, py), 0x2C, "attr {:#04X}", attr);
        // Every other pixel of the sprite box is transparent
        for y in 50..58 {
            for x in 100..108 {
                if (x, y) != (px, py) {
                    assert_eq!(frame.get_pixel(x, y), 0x0D, "attr {:#04X}", attr);
                }
            }
        }
    }
}

#[test]
fn test_8x16_sprite_uses_tile_pair() {
    // Tile 2 blank, tile 3 solid: the sprite's bottom half only
    let mut chr = vec![0u8; 8 * 1024];
    for byte in chr[3 * 16..4 * 16].iter_mut() {
        *byte = 0xFF;
    }
    let mut ppu = ppu_with_chr(chr, Mirroring::Horizontal);
    for i in 0..64 {
        ppu.write_oam(i * 4, 0xF0);
    }
    set_sprite(&mut ppu, 0, 49, 2, 0x00, 100);
    ppu.write(PPUCTRL, CTRL_SPRITE_SIZE);
    ppu.write_ppu_memory(0x3F00, 0x0D);
    ppu.write_ppu_memory(0x3F13, 0x27);
    ppu.write(PPUMASK, MASK_SHOW_SPRITES | MASK_SHOW_SPRITES_LEFT);

    run_one_frame(&mut ppu);

    let frame = ppu.frame();
    assert_eq!(frame.get_pixel(100, 52), 0x0D);
    assert_eq!(frame.get_pixel(100, 60), 0x27);
    assert_eq!(frame.get_pixel(100, 65), 0x27);
    assert_eq!(frame.get_pixel(100, 66), 0x0D);
}

#[test]
fn test_sprite_left_edge_clipping() {
    let mut ppu = ppu_for_sprites();
    set_sprite(&mut ppu, 0, 49, 1, 0x00, 4);
    ppu.write_ppu_memory(0x3F00, 0x0D);
    ppu.write_ppu_memory(0x3F13, 0x27);
    ppu.write(PPUMASK, MASK_SHOW_SPRITES);

    run_one_frame(&mut ppu);

    let frame = ppu.frame();
    for x in 4..8 {
        assert_eq!(frame.get_pixel(x, 50), 0x0D);
    }
    for x in 8..12 {
        assert_eq!(frame.get_pixel(x, 50), 0x27);
    }
}

// ========================================
// Sprite Zero Hit Tests
// ========================================

#[test]
fn test_sprite_zero_hit_on_overlap() {
    let mut ppu = ppu_for_sprites();
    set_sprite(&mut ppu, 0, 49, 1, 0x00, 100);
    ppu.write(
        PPUMASK,
        MASK_SHOW_BG | MASK_SHOW_SPRITES | MASK_SHOW_BG_LEFT | MASK_SHOW_SPRITES_LEFT,
    );

    // The beam has not reached the sprite yet
    advance_to_dot(&mut ppu, 50, 100);
    assert_eq!(ppu.ppustatus & STATUS_SPRITE_ZERO_HIT, 0);

    // Cycle 101 draws pixel x=100, the first overlap
    advance_to_dot(&mut ppu, 50, 101);
    assert_ne!(ppu.ppustatus & STATUS_SPRITE_ZERO_HIT, 0);
}

#[test]
fn test_sprite_zero_hit_requires_opaque_background() {
    let mut ppu = ppu_for_sprites();
    set_sprite(&mut ppu, 0, 49, 1, 0x00, 100);
    ppu.write(PPUMASK, MASK_SHOW_SPRITES | MASK_SHOW_SPRITES_LEFT);

    advance_to_dot(&mut ppu, 60, 0);
    assert_eq!(ppu.ppustatus & STATUS_SPRITE_ZERO_HIT, 0);
}

#[test]
fn test_no_sprite_zero_hit_from_other_sprites() {
    let mut ppu = ppu_for_sprites();
    set_sprite(&mut ppu, 3, 49, 1, 0x00, 100);
    ppu.write(
        PPUMASK,
        MASK_SHOW_BG | MASK_SHOW_SPRITES | MASK_SHOW_BG_LEFT | MASK_SHOW_SPRITES_LEFT,
    );

    advance_to_dot(&mut ppu, 60, 0);
    assert_eq!(ppu.ppustatus & STATUS_SPRITE_ZERO_HIT, 0);
}

#[test]
fn test_no_sprite_zero_hit_at_x_255() {
    let mut ppu = ppu_for_sprites();
    set_sprite(&mut ppu, 0, 49, 1, 0x00, 255);
    ppu.write(
        PPUMASK,
        MASK_SHOW_BG | MASK_SHOW_SPRITES | MASK_SHOW_BG_LEFT | MASK_SHOW_SPRITES_LEFT,
    );

    advance_to_dot(&mut ppu, 60, 0);
    assert_eq!(ppu.ppustatus & STATUS_SPRITE_ZERO_HIT, 0);
}

#[test]
fn test_sprite_zero_hit_ignores_priority() {
    let mut ppu = ppu_for_sprites();
    set_sprite(&mut ppu, 0, 49, 1, 0x20, 100);
    ppu.write(
        PPUMASK,
        MASK_SHOW_BG | MASK_SHOW_SPRITES | MASK_SHOW_BG_LEFT | MASK_SHOW_SPRITES_LEFT,
    );

    advance_to_dot(&mut ppu, 60, 0);
    assert_ne!(ppu.ppustatus & STATUS_SPRITE_ZERO_HIT, 0);
}
